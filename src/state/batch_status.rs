use std::fmt;

/// Status of one batch, derived from the checkpoint's processed count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every record of the batch is covered by the checkpoint
    Done,
    /// The batch is the next one to run, or partly covered
    InProgress,
    /// Not reached yet
    Pending,
}

impl BatchStatus {
    /// Derives the status of the batch covering `[start, end)`
    ///
    /// Only the first uncovered batch of an unfinished run is `InProgress`.
    pub fn derive(start: usize, end: usize, processed: usize) -> Self {
        if end <= processed {
            Self::Done
        } else if start <= processed {
            Self::InProgress
        } else {
            Self::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::InProgress => "in progress",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
