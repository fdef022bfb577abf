use std::collections::HashMap;
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::sync::Arc;

use crate::errors::ParseError;
use crate::traits::{
    NativeSpectrum,
    ParserHandle,
    SpectrumHeader,
};

enum Entry {
    Spectrum(NativeSpectrum),
    Corrupt(String),
}

/// Parser over spectra that already live in memory.
///
/// Useful for programmatic sources and for tests. Spectra can also be
/// registered as corrupt, in which case fetching them fails with
/// [`ParseError::Malformed`].
#[derive(Default)]
pub struct InMemoryParser {
    order: Vec<String>,
    entries: HashMap<String, Entry>,
    fetches: Arc<AtomicUsize>,
    closes: CloseCounter,
}

impl InMemoryParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a spectrum.
    pub fn push(&mut self, id: impl Into<String>, spectrum: NativeSpectrum) {
        self.insert(id.into(), Entry::Spectrum(spectrum));
    }

    pub fn push_points(&mut self, id: impl Into<String>, points: Vec<(f64, f64)>) {
        self.push(id, NativeSpectrum::new(points));
    }

    pub fn push_with_header(
        &mut self,
        id: impl Into<String>,
        header: SpectrumHeader,
        points: Vec<(f64, f64)>,
    ) {
        self.push(id, NativeSpectrum::new(points).with_header(header));
    }

    /// Registers an id whose data cannot be decoded.
    pub fn push_corrupt(&mut self, id: impl Into<String>, reason: impl Into<String>) {
        self.insert(id.into(), Entry::Corrupt(reason.into()));
    }

    fn insert(&mut self, id: String, entry: Entry) {
        if self.entries.insert(id.clone(), entry).is_none() {
            self.order.push(id);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Shared counter of `spectrum_by_id` calls, survives the parser.
    pub fn fetch_counter(&self) -> Arc<AtomicUsize> {
        self.fetches.clone()
    }

    /// Shared counter of `close` calls, survives the parser.
    pub fn close_counter(&self) -> CloseCounter {
        self.closes.clone()
    }
}

impl ParserHandle for InMemoryParser {
    fn format_name(&self) -> &'static str {
        "in-memory"
    }

    fn spectrum_ids(&mut self) -> Result<Vec<String>, ParseError> {
        Ok(self.order.clone())
    }

    fn spectrum_by_id(&mut self, id: &str) -> Result<NativeSpectrum, ParseError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        match self.entries.get(id) {
            Some(Entry::Spectrum(spectrum)) => Ok(spectrum.clone()),
            Some(Entry::Corrupt(reason)) => Err(ParseError::malformed(0, reason)),
            None => Err(ParseError::UnknownSpectrum(id.to_string())),
        }
    }

    fn close(&mut self) {
        self.closes.0.fetch_add(1, Ordering::SeqCst);
        self.entries.clear();
        self.order.clear();
    }
}

#[derive(Debug, Clone, Default)]
pub struct CloseCounter(Arc<AtomicUsize>);

impl CloseCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_keep_insertion_order() {
        let mut parser = InMemoryParser::new();
        parser.push_points("b", vec![]);
        parser.push_points("a", vec![]);
        parser.push_points("b", vec![(1.0, 1.0)]);
        assert_eq!(parser.spectrum_ids().unwrap(), vec!["b", "a"]);
        assert_eq!(parser.spectrum_by_id("b").unwrap().points, vec![(1.0, 1.0)]);
    }

    #[test]
    fn test_corrupt_and_unknown() {
        let mut parser = InMemoryParser::new();
        parser.push_corrupt("bad", "truncated binary array");
        assert!(matches!(
            parser.spectrum_by_id("bad"),
            Err(ParseError::Malformed { .. })
        ));
        assert!(matches!(
            parser.spectrum_by_id("missing"),
            Err(ParseError::UnknownSpectrum(id)) if id == "missing"
        ));
        assert_eq!(parser.fetch_counter().load(Ordering::Relaxed), 2);
    }
}
