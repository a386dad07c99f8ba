//! N-gram TF-IDF feature extraction.
//!
//! [`TfidfVectorizer`] holds the fit settings; [`TfidfVectorizer::fit`]
//! returns a frozen [`TfidfModel`] whose vocabulary never changes again.
//! Projections are sparse [`FeatureVector`]s of fixed dimension.

mod tfidf_vectorizer;

pub use tfidf_vectorizer::{FeatureVector, TfidfModel, TfidfVectorizer};
