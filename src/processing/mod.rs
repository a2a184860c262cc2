//! Text processing and analysis module

pub mod lexicon;
pub mod linguistic;
pub mod text_processor;
pub mod tfidf;
pub mod svd;
pub mod embeddings;
pub mod embedding_manager;
pub mod analyzer;
