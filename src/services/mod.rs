pub mod encoder;
pub mod gate;
pub mod qr;
pub mod summarizer;
pub mod viewer;
