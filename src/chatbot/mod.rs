mod client;

pub use client::{
    ChatAnswer, ChatAnswerSource, ChatbotClient, ChatbotError, IndexedDocument,
};
