use std::io::IsTerminal;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::Subscriber;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Filter directives used when `RUST_LOG` is unset.
    ///
    /// Default: `info`
    pub filter: String,

    pub outputs: Vec<LoggerOutput>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            outputs: vec![LoggerOutput::Stderr {
                format: LogFormat::Auto,
            }],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Auto,
    Human,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoggerOutput {
    Stderr {
        #[serde(default)]
        format: LogFormat,
    },
    File(LoggerFileOutput),
}

impl LoggerOutput {
    fn as_layer<S>(&self) -> Result<BoxedLayer<S>>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        match self {
            Self::Stderr { format } => Ok(stderr_layer(*format)),
            Self::File(file) => file.as_layer(),
        }
    }
}

fn stderr_layer<S>(format: LogFormat) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Json => tracing_stackdriver::layer()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Human | LogFormat::Auto if is_systemd_child() => fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_ansi(false)
            .boxed(),
        LogFormat::Human | LogFormat::Auto => fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .boxed(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerFileOutput {
    pub dir: PathBuf,
    /// `auto` means JSON for files.
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "log_file_prefix")]
    pub file_prefix: String,
    #[serde(default = "max_log_files")]
    pub max_files: NonZeroUsize,
}

impl LoggerFileOutput {
    fn as_layer<S>(&self) -> Result<BoxedLayer<S>>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let writer = tracing_appender::rolling::Builder::new()
            .rotation(Rotation::DAILY)
            .filename_prefix(&self.file_prefix)
            .max_log_files(self.max_files.get())
            .build(&self.dir)
            .with_context(|| format!("failed to open log dir {}", self.dir.display()))?;

        Ok(match self.format {
            LogFormat::Human => fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .boxed(),
            LogFormat::Json | LogFormat::Auto => {
                tracing_stackdriver::layer().with_writer(writer).boxed()
            }
        })
    }
}

fn log_file_prefix() -> String {
    "gatekit.log".to_owned()
}

fn max_log_files() -> NonZeroUsize {
    NonZeroUsize::new(7).expect("shouldn't happen")
}

pub fn is_systemd_child() -> bool {
    #[cfg(target_os = "linux")]
    unsafe {
        libc::getppid() == 1 || std::env::var_os("SYSTEMD_EXEC_PID").is_some()
    }

    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

/// Installs the global subscriber. Fails if one is already set.
pub fn init_logger(config: &LoggerConfig) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => EnvFilter::try_new(directives),
        Err(_) => EnvFilter::try_new(&config.filter),
    }
    .context("invalid log filter")?;

    let outputs = config
        .outputs
        .iter()
        .map(|o| o.as_layer())
        .collect::<Result<Vec<_>>>()?;

    tracing_subscriber::registry()
        .with(filter)
        .with(outputs)
        .try_init()
        .context("logger was already initialized")
}

pub fn set_abort_with_tracing() {
    std::panic::set_hook(Box::new(|info| {
        use std::io::Write;

        let backtrace = std::backtrace::Backtrace::force_capture();
        tracing::error!("panic: {info}\n{backtrace}");

        std::io::stderr().flush().ok();

        #[allow(clippy::exit)]
        std::process::exit(1);
    }));
}
