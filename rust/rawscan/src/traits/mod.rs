pub mod parser_handle;

pub use parser_handle::{
    NativeSpectrum,
    ParserHandle,
    SpectrumHeader,
};
