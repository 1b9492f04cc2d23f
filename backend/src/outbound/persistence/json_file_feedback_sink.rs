//! Feedback sink persisted as a JSON array in the data directory.

use async_trait::async_trait;
use camino::Utf8Path;
use tokio::sync::Mutex;

use crate::domain::ports::{FeedbackSink, FeedbackSinkError};
use crate::domain::{Feedback, NewFeedback};

use super::in_memory::newest_first;
use super::json_file::{JsonFile, JsonFileError};

/// File name of the feedback document.
pub const FEEDBACK_FILE: &str = "feedback.json";

impl From<JsonFileError> for FeedbackSinkError {
    fn from(err: JsonFileError) -> Self {
        FeedbackSinkError::connection(err.to_string())
    }
}

/// Append-only JSON-file feedback sink.
#[derive(Debug)]
pub struct JsonFileFeedbackSink {
    file: JsonFile,
    records: Mutex<Vec<Feedback>>,
}

impl JsonFileFeedbackSink {
    /// Open or create the sink in `data_dir`.
    pub fn open(data_dir: &Utf8Path) -> Result<Self, FeedbackSinkError> {
        let file = JsonFile::open(data_dir, FEEDBACK_FILE)?;
        let records = match file.read()? {
            Some(contents) => serde_json::from_str(&contents)
                .map_err(|err| FeedbackSinkError::query(format!("decode feedback: {err}")))?,
            None => Vec::new(),
        };
        Ok(Self {
            file,
            records: Mutex::new(records),
        })
    }
}

#[async_trait]
impl FeedbackSink for JsonFileFeedbackSink {
    async fn append(&self, feedback: NewFeedback) -> Result<Feedback, FeedbackSinkError> {
        let stored = Feedback::from_new(feedback);
        let mut records = self.records.lock().await;
        let mut draft = records.clone();
        draft.push(stored.clone());
        let contents = serde_json::to_string_pretty(&draft)
            .map_err(|err| FeedbackSinkError::query(format!("encode feedback: {err}")))?;
        self.file.write(contents).await?;
        *records = draft;
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<Feedback>, FeedbackSinkError> {
        Ok(newest_first(self.records.lock().await.clone()))
    }
}
