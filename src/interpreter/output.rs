use super::OutputSink;

#[derive(Debug, Default)]
pub struct BufferedOutput {
    buffer: String,
}

impl BufferedOutput {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn into_data(self) -> String {
        self.buffer
    }
}

impl OutputSink for BufferedOutput {
    fn write_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}
