use log::{debug, warn};
use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 外部程序執行選項
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub timeout: Option<Duration>,
    /// 僅在程序無法啟動時重試，啟動後的非零結束碼不重試
    pub spawn_retries: u32,
    pub retry_backoff: Duration,
    pub shutdown_signal: Arc<AtomicBool>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            spawn_retries: 0,
            retry_backoff: Duration::from_millis(500),
            shutdown_signal: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// 程序結束後的結果
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// stderr 最後幾行，用於錯誤訊息
    #[must_use]
    pub fn stderr_tail(&self, lines: usize) -> String {
        let all: Vec<&str> = self
            .stderr
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        all[all.len().saturating_sub(lines)..].join("\n")
    }
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("無法啟動 {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} 執行逾時（{} 秒），已終止", timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },
    #[error("{program} 因中斷信號被終止")]
    Cancelled { program: String },
    #[error("無法取得 {program} 的狀態: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// 執行外部程序直到結束、逾時或收到中斷信號
///
/// `build` 每次嘗試都會重新呼叫，因為 `Command` 無法重複 spawn 後保留設定
pub fn run_command<F>(build: F, options: &RunOptions) -> Result<ProcessOutput, ProcessError>
where
    F: Fn() -> Command,
{
    let (mut child, program) = spawn_with_retry(&build, options)?;
    let stdout_reader = spawn_pipe_reader(child.stdout.take());
    let stderr_reader = spawn_pipe_reader(child.stderr.take());
    let started = Instant::now();

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(source) => {
                kill_and_reap(&mut child, &program);
                return Err(ProcessError::Wait { program, source });
            }
        }

        if options.shutdown_signal.load(Ordering::SeqCst) {
            kill_and_reap(&mut child, &program);
            return Err(ProcessError::Cancelled { program });
        }

        if let Some(timeout) = options.timeout
            && started.elapsed() >= timeout
        {
            warn!("{program} 超過 {} 秒未結束，終止程序", timeout.as_secs());
            kill_and_reap(&mut child, &program);
            return Err(ProcessError::TimedOut { program, timeout });
        }

        thread::sleep(POLL_INTERVAL);
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();
    debug!("{program} 結束: {status}");

    Ok(ProcessOutput {
        success: status.success(),
        exit_code: status.code(),
        stdout,
        stderr,
    })
}

fn spawn_with_retry<F>(build: &F, options: &RunOptions) -> Result<(Child, String), ProcessError>
where
    F: Fn() -> Command,
{
    let mut backoff = options.retry_backoff;
    let mut attempt = 0;

    loop {
        let mut command = build();
        let program = command.get_program().to_string_lossy().into_owned();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        match command.spawn() {
            Ok(child) => return Ok((child, program)),
            Err(source)
                if attempt < options.spawn_retries
                    && is_transient(&source)
                    && !options.shutdown_signal.load(Ordering::SeqCst) =>
            {
                attempt += 1;
                warn!(
                    "無法啟動 {program}（第 {attempt}/{} 次重試，{} ms 後）: {source}",
                    options.spawn_retries,
                    backoff.as_millis()
                );
                thread::sleep(backoff);
                backoff = backoff.saturating_mul(2);
            }
            Err(source) => return Err(ProcessError::Spawn { program, source }),
        }
    }
}

/// 找不到執行檔或沒有權限時重試也沒有用
fn is_transient(error: &io::Error) -> bool {
    !matches!(
        error.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    )
}

/// 持續讀取管線，避免緩衝區塞滿讓子程序卡住
fn spawn_pipe_reader<P>(pipe: Option<P>) -> JoinHandle<String>
where
    P: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut bytes = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut bytes);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    })
}

fn kill_and_reap(child: &mut Child, program: &str) {
    if let Err(e) = child.kill() {
        warn!("無法終止 {program} [{}]: {e}", child.id());
    }
    let _ = child.wait();
}
