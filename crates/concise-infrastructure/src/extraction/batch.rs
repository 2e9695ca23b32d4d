use super::{
    ExtractionOutcome, ExtractionStats, FileCategory, FileInfo, SourceFile, extract,
};
use concise_core::attachment::FileHandle;
use concise_core::config::AttachmentConfig;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

/// Runs [`extract_batch`] with the configured attachment deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchExtractor {
    timeout: Duration,
}

impl BatchExtractor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &AttachmentConfig) -> Self {
        Self::new(config.batch_timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn extract(&self, handles: &[FileHandle]) -> Vec<ExtractionOutcome> {
        extract_batch(handles, self.timeout).await
    }
}

impl Default for BatchExtractor {
    fn default() -> Self {
        Self::from_config(&AttachmentConfig::default())
    }
}

/// Reads and extracts every attachment under one deadline.
///
/// Files that cannot be read become failed outcomes. When the deadline
/// passes the whole batch collapses into a single failed outcome.
pub async fn extract_batch(handles: &[FileHandle], timeout: Duration) -> Vec<ExtractionOutcome> {
    let work = async {
        let mut sources = Vec::with_capacity(handles.len());
        let mut unreadable = Vec::new();
        for (index, handle) in handles.iter().enumerate() {
            match SourceFile::load(&handle.path).await {
                Ok(source) => sources.push((index, source)),
                Err(err) => unreadable.push((index, read_failure(handle, &err.to_string()))),
            }
        }

        let extracted = run_extractors(sources).await;
        let mut outcomes: Vec<(usize, ExtractionOutcome)> =
            extracted.into_iter().chain(unreadable).collect();
        outcomes.sort_by_key(|(index, _)| *index);
        outcomes
            .into_iter()
            .map(|(_, outcome)| outcome)
            .collect::<Vec<_>>()
    };

    let total_size = handles.iter().map(|handle| handle.size).sum();
    within_deadline(work, handles.len(), total_size, timeout).await
}

async fn within_deadline<F>(
    work: F,
    count: usize,
    total_size: u64,
    timeout: Duration,
) -> Vec<ExtractionOutcome>
where
    F: Future<Output = Vec<ExtractionOutcome>>,
{
    match tokio::time::timeout(timeout, work).await {
        Ok(outcomes) => outcomes,
        Err(_) => vec![timed_out(count, total_size, timeout)],
    }
}

async fn run_extractors(sources: Vec<(usize, SourceFile)>) -> Vec<(usize, ExtractionOutcome)> {
    run_isolated(sources, extract).await
}

/// Runs `extractor` over every file on the blocking pool. A panic while
/// extracting one file becomes that file's failed outcome.
async fn run_isolated(
    sources: Vec<(usize, SourceFile)>,
    extractor: fn(&SourceFile) -> ExtractionOutcome,
) -> Vec<(usize, ExtractionOutcome)> {
    let infos: Vec<(usize, FileInfo)> = sources
        .iter()
        .map(|(index, source)| (*index, source.info()))
        .collect();

    let joined = tokio::task::spawn_blocking(move || {
        sources
            .into_iter()
            .map(|(index, source)| {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| extractor(&source)))
                    .unwrap_or_else(|_| {
                        tracing::error!("[Extraction] Extractor panicked on {}", source.name);
                        panicked(&source)
                    });
                (index, outcome)
            })
            .collect::<Vec<_>>()
    })
    .await;

    match joined {
        Ok(outcomes) => outcomes,
        Err(err) => {
            tracing::error!("[Extraction] Extraction task failed: {}", err);
            infos
                .into_iter()
                .map(|(index, info)| {
                    let outcome = failure(
                        FileCategory::detect(&info.extension, &info.mime_type),
                        info,
                        format!("File processing failed: {err}"),
                    );
                    (index, outcome)
                })
                .collect()
        }
    }
}

fn panicked(source: &SourceFile) -> ExtractionOutcome {
    let info = source.info();
    failure(
        FileCategory::detect(&info.extension, &info.mime_type),
        info,
        format!("File processing failed: {} could not be parsed", source.name),
    )
}

fn failure(category: FileCategory, file_info: FileInfo, message: String) -> ExtractionOutcome {
    ExtractionOutcome {
        success: false,
        category,
        content: None,
        error: Some(message),
        fallback_content: None,
        stats: ExtractionStats::default(),
        file_info,
    }
}

fn read_failure(handle: &FileHandle, reason: &str) -> ExtractionOutcome {
    let extension = handle.extension();
    failure(
        FileCategory::detect(&extension, &handle.mime_type),
        FileInfo {
            name: handle.name.clone(),
            size: handle.size,
            mime_type: handle.mime_type.clone(),
            extension,
            last_modified: None,
        },
        format!("Failed to read file: {reason}"),
    )
}

fn timed_out(count: usize, total_size: u64, timeout: Duration) -> ExtractionOutcome {
    tracing::warn!(
        "[Extraction] Processing {} attachment(s) exceeded {:?}",
        count,
        timeout
    );
    batch_failure(
        count,
        total_size,
        format!(
            "File processing timed out after {} seconds",
            timeout.as_secs()
        ),
    )
}

fn batch_failure(count: usize, total_size: u64, message: String) -> ExtractionOutcome {
    failure(
        FileCategory::Batch,
        FileInfo {
            name: format!("{count} attachment(s)"),
            mime_type: String::new(),
            size: total_size,
            extension: String::new(),
            last_modified: None,
        },
        message,
    )
}
