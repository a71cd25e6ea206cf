pub const DEFAULT_THRESHOLD: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Direct,
    Summarize,
}

/// Hard cutoff on payload length, measured in chars.
#[derive(Debug, Clone, Copy)]
pub struct LengthGate {
    threshold: usize,
}

impl LengthGate {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn route(&self, text: &str) -> Route {
        if text.chars().count() > self.threshold {
            Route::Summarize
        } else {
            Route::Direct
        }
    }
}

impl Default for LengthGate {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
