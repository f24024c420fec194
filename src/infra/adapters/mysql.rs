use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tokio::time::timeout;
use tracing::debug;

use crate::app::ports::{EngineStatusSource, SqlExecutor, StoreError};
use crate::domain::{ConnectionProfile, EngineStatusSnapshot, WriteExecutionResult};
use crate::engine_status::parse_engine_status;

const ENGINE_STATUS_QUERY: &str = "SHOW ENGINE INNODB STATUS";

/// Talks to MySQL through the `mysql` command-line client.
///
/// Each statement runs in its own short-lived child process, so the adapter
/// holds no connection state between calls. Statements travel over the
/// child's stdin; argv only carries connection flags, so statement size is
/// not bounded by the OS argument limit.
pub struct MySqlAdapter {
    profile: ConnectionProfile,
    mysql_bin: String,
    timeout_secs: u64,
}

struct ClientOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

impl MySqlAdapter {
    pub fn new(profile: ConnectionProfile) -> Self {
        Self {
            profile,
            mysql_bin: "mysql".to_string(),
            timeout_secs: 30,
        }
    }

    pub fn with_binary(mut self, mysql_bin: impl Into<String>) -> Self {
        self.mysql_bin = mysql_bin.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    /// Client arguments. The password never appears here; it is handed over
    /// through `MYSQL_PWD` instead.
    fn connection_args(&self) -> Vec<String> {
        let mut args = vec![
            "--host".to_string(),
            self.profile.host.clone(),
            "--port".to_string(),
            self.profile.port.to_string(),
            "--user".to_string(),
            self.profile.username.clone(),
        ];
        if !self.profile.database.is_empty() {
            args.push("--database".to_string());
            args.push(self.profile.database.clone());
        }
        // Tab-separated rows, no escaping, no header line.
        args.extend(
            ["--batch", "--raw", "--skip-column-names", "--no-auto-rehash"].map(String::from),
        );
        args
    }

    fn spawn_error(&self, error: io::Error) -> StoreError {
        match error.kind() {
            io::ErrorKind::NotFound => StoreError::CommandNotFound(self.mysql_bin.clone()),
            _ => StoreError::QueryFailed(format!("Failed to start {}: {}", self.mysql_bin, error)),
        }
    }

    async fn run(&self, sql: &str) -> Result<String, StoreError> {
        let mut command = Command::new(&self.mysql_bin);
        command
            .args(self.connection_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if self.profile.has_password() {
            command.env("MYSQL_PWD", &self.profile.password);
        }

        let mut child = command.spawn().map_err(|e| self.spawn_error(e))?;
        let (Some(stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(StoreError::QueryFailed(
                "mysql client pipes were not captured".to_string(),
            ));
        };

        let script = statement_script(sql);
        let exchange = async {
            // Feeding and draining run together so neither side stalls on a full pipe.
            let (fed, stdout, stderr) =
                tokio::join!(feed_stdin(stdin, &script), read_pipe(stdout), read_pipe(stderr));
            fed?;
            let status = child.wait().await?;
            Ok::<_, io::Error>(ClientOutput {
                status,
                stdout: stdout?,
                stderr: stderr?,
            })
        };

        // On timeout the exchange is dropped and kill_on_drop reaps the client.
        let output = timeout(Duration::from_secs(self.timeout_secs), exchange)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout_secs))?
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        if !output.status.success() {
            return Err(StoreError::QueryFailed(output.stderr.trim().to_string()));
        }
        Ok(output.stdout)
    }

    /// Last non-empty line of `<stmt>; SELECT ROW_COUNT();` output.
    /// ROW_COUNT() is -1 for statements that report no row count.
    fn parse_affected_rows(stdout: &str) -> Option<u64> {
        stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .and_then(|line| line.parse::<i64>().ok())
            .map(|count| count.max(0) as u64)
    }

    fn with_row_count(sql: &str) -> String {
        let statement = sql.trim().trim_end_matches(';');
        format!("{}; SELECT ROW_COUNT();", statement)
    }
}

/// Terminates the last statement so the client runs it before EOF.
fn statement_script(sql: &str) -> String {
    format!("{};\n", sql.trim().trim_end_matches(';'))
}

async fn feed_stdin(mut stdin: ChildStdin, script: &str) -> io::Result<()> {
    match stdin.write_all(script.as_bytes()).await {
        // The client quit early; its exit status and stderr say why.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        result => result,
    }
    // Dropping stdin closes the pipe and signals end of input.
}

async fn read_pipe<R: AsyncRead + Unpin>(mut pipe: R) -> io::Result<String> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[async_trait]
impl SqlExecutor for MySqlAdapter {
    async fn execute_write(&self, sql: &str) -> Result<WriteExecutionResult, StoreError> {
        let start = Instant::now();
        let stdout = self.run(&Self::with_row_count(sql)).await?;
        let elapsed = start.elapsed();

        let affected_rows = Self::parse_affected_rows(&stdout).ok_or_else(|| {
            StoreError::ParseError("Failed to parse affected row count".to_string())
        })?;
        let result = WriteExecutionResult {
            affected_rows,
            elapsed,
        };
        debug!(
            affected_rows,
            elapsed_ms = result.execution_time_ms(),
            "Write executed"
        );
        Ok(result)
    }

    async fn execute_query(&self, sql: &str) -> Result<String, StoreError> {
        self.run(sql).await
    }
}

#[async_trait]
impl EngineStatusSource for MySqlAdapter {
    async fn snapshot(&self) -> Result<EngineStatusSnapshot, StoreError> {
        let text = self.execute_query(ENGINE_STATUS_QUERY).await?;
        Ok(parse_engine_status(&text))
    }
}
