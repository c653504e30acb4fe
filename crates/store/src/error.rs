use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("message id '{raw}' is invalid"))]
    InvalidId {
        stage: &'static str,
        raw: String,
        source: uuid::Error,
    },
    #[snafu(display("message for room '{room}' has a blank author"))]
    BlankAuthor { stage: &'static str, room: String },
    #[snafu(display("message for room '{room}' has no content"))]
    BlankContent { stage: &'static str, room: String },
}

pub type StoreResult<T> = Result<T, StoreError>;
