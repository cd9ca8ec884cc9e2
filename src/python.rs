//! Python bindings, a drop-in for the pipeline's `generate_response(chunk)` matchers.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::chunk::chunk_by_words;
use crate::engine::TermSearchEngine;
use crate::result::MatchResult;

/// OCR-tolerant regex matcher over a fixed list of terms.
#[pyclass(name = "RegexSearchModel", module = "rust_ocr_terms", frozen)]
struct RegexSearchModel {
    engine: TermSearchEngine,
}

#[pymethods]
impl RegexSearchModel {
    #[new]
    fn new(terms: Vec<String>) -> PyResult<Self> {
        let engine = TermSearchEngine::new(&terms).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { engine })
    }

    #[getter]
    fn terms(&self) -> Vec<String> {
        self.engine.terms().map(str::to_owned).collect()
    }

    /// Compiled expression source per term
    #[getter]
    fn patterns(&self) -> Vec<String> {
        self.engine
            .patterns()
            .iter()
            .map(|p| p.as_str().to_owned())
            .collect()
    }

    /// Returns {"success": bool, "word1": [...], ...}
    fn generate_response<'py>(&self, py: Python<'py>, chunk: &str) -> PyResult<Bound<'py, PyDict>> {
        result_to_dict(py, &self.engine.search(chunk))
    }

    /// Batch version of generate_response, searched in parallel
    fn generate_responses<'py>(
        &self,
        py: Python<'py>,
        chunks: Vec<String>,
    ) -> PyResult<Vec<Bound<'py, PyDict>>> {
        self.engine
            .search_batch(&chunks)
            .iter()
            .map(|result| result_to_dict(py, result))
            .collect()
    }
}

fn result_to_dict<'py>(py: Python<'py>, result: &MatchResult) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("success", result.success())?;
    for (label, words) in result.labeled() {
        dict.set_item(label, words.to_vec())?;
    }
    if let Some(raw) = result.raw_response() {
        dict.set_item("raw_response", raw)?;
    }
    Ok(dict)
}

/// Split page text into windows of `max_words` words
#[pyfunction]
fn chunk_text_by_words(text: &str, max_words: usize) -> Vec<String> {
    chunk_by_words(text, max_words)
}

#[pymodule]
fn rust_ocr_terms(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<RegexSearchModel>()?;
    m.add_function(wrap_pyfunction!(chunk_text_by_words, m)?)?;
    Ok(())
}
