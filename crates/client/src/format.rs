//! Plain-text rendering of job snapshots for terminals and chat messages.

use std::fmt::Write;

use bridge_core::output::truncate_output;
use bridge_core::wire::{HealthResponse, JobSnapshot, SubmitJobResponse};

/// Per-stream cap when printing captured output.
pub const DISPLAY_OUTPUT_CHARS: usize = 1000;

pub fn format_submitted(created: &SubmitJobResponse) -> String {
    format!(
        "job queued\n  job_id: {}\n  status: {}\n  poll:   {}",
        created.job_id, created.status, created.status_url
    )
}

/// Render a snapshot. Non-terminal jobs only show identity and status.
pub fn format_job(job: &JobSnapshot, max_output_chars: usize) -> String {
    let mut out = String::new();
    let heading = if job.status.is_terminal() {
        "job finished"
    } else {
        "job in progress"
    };
    let _ = writeln!(out, "{heading}");
    let _ = writeln!(out, "  job_id:     {}", job.id);
    let _ = writeln!(out, "  status:     {}", job.status);
    let _ = writeln!(out, "  created_at: {}", job.created_at.to_rfc3339());

    if !job.status.is_terminal() {
        return out.trim_end().to_string();
    }

    match job.exit_code {
        Some(code) => {
            let _ = writeln!(out, "  exit_code:  {code}");
        }
        None => {
            let _ = writeln!(out, "  exit_code:  -");
        }
    }
    for (label, text) in [("stdout", &job.stdout), ("stderr", &job.stderr)] {
        let text = text.as_deref().unwrap_or("").trim();
        if !text.is_empty() {
            let _ = writeln!(out, "  {label}:");
            let _ = writeln!(out, "{}", truncate_output(text.to_string(), max_output_chars));
        }
    }
    if let Some(error) = job.error.as_deref().filter(|e| !e.is_empty()) {
        let _ = writeln!(out, "  error:      {error}");
    }
    out.trim_end().to_string()
}

pub fn format_health(health: &HealthResponse) -> String {
    format!(
        "bridge {} ok={} queued={} running={} time={}",
        health.version,
        health.ok,
        health.queued,
        health.running,
        health.time.to_rfc3339()
    )
}

#[cfg(test)]
mod tests {
    use bridge_core::job::JobStatus;
    use bridge_core::output::TRUNCATION_MARKER;
    use bridge_core::types::JobId;
    use chrono::Utc;

    use super::*;

    fn snapshot(status: JobStatus) -> JobSnapshot {
        JobSnapshot {
            id: JobId::new_v4(),
            status,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            exit_code: None,
            stdout: None,
            stderr: None,
            error: None,
        }
    }

    #[test]
    fn pending_job_hides_result_fields() {
        let text = format_job(&snapshot(JobStatus::Running), 100);
        assert!(text.starts_with("job in progress"));
        assert!(text.contains("status:     running"));
        assert!(!text.contains("exit_code"));
    }

    #[test]
    fn finished_job_shows_output_and_error() {
        let mut job = snapshot(JobStatus::Failed);
        job.exit_code = Some(2);
        job.stderr = Some("boom\n".into());
        job.error = Some("command timed out after 1s".into());

        let text = format_job(&job, 100);
        assert!(text.starts_with("job finished"));
        assert!(text.contains("exit_code:  2"));
        assert!(text.contains("stderr:\nboom"));
        assert!(!text.contains("stdout:"));
        assert!(text.contains("error:      command timed out after 1s"));
    }

    #[test]
    fn long_output_is_cut_for_display() {
        let mut job = snapshot(JobStatus::Succeeded);
        job.exit_code = Some(0);
        job.stdout = Some("z".repeat(50));

        let text = format_job(&job, 10);
        assert!(text.contains(&format!("{}{TRUNCATION_MARKER}", "z".repeat(10))));
    }
}
