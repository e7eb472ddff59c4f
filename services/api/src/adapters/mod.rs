pub mod advice_llm;
pub mod db;
pub mod hasher;
pub mod json_store;

pub use advice_llm::{OpenAiAdviceAdapter, UnavailableAdvisor};
pub use db::DbAdapter;
pub use hasher::Argon2Hasher;
pub use json_store::open_json_store;
