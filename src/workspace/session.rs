use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::attribution::{build_commit_labels, latest_marker_date, regenerate_markers, AnnotateOptions};
use crate::audit::{analyze_file, scan_missing_dates, AuditCache, AuditResult, DocStatus, FindingKind};
use crate::config::{ScanMode, Settings};
use crate::docs::{
    build_prompt, clean_response, forensic_summary, generate_with_retry, DocGenerator, ForensicCommit,
    GenerationError, RetryPolicy, MAX_FORENSIC_COMMITS, NO_HEADER_LOG_LIMIT,
};
use crate::error::{CoreError, CoreResult};
use crate::filter::{filter_commits_by_date, filter_skipped_commits};
use crate::header::header_date;
use crate::history::CommitInfo;
use crate::marker::ensure_markers_with;
use crate::vcs::{DiffTarget, LogQuery, VersionControl};

use super::guard::InFlight;
use super::types::{
    BatchOutput, BatchReport, DocOutcome, Finding, FixOutcome, ScanReport, Severity, SourceFile, UpdatedFile,
};

const DEFAULT_SIGN: &str = "AI";
const SIGN_LEN: usize = 5;

/// One editor session over a repository.
///
/// Owns the settings, the audit cache and the set of paths being worked on.
/// Construct one per workspace and pass it by reference; nothing here is
/// global.
pub struct Workspace {
    settings: Settings,
    vcs: Arc<dyn VersionControl>,
    generator: Option<Arc<dyn DocGenerator>>,
    cache: AuditCache,
    in_flight: InFlight,
    cancelled: AtomicBool,
}

impl Workspace {
    pub fn new(settings: Settings, vcs: Arc<dyn VersionControl>) -> Self {
        Workspace {
            settings,
            vcs,
            generator: None,
            cache: AuditCache::new(),
            in_flight: InFlight::default(),
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn DocGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Start from audit records the host persisted in an earlier session.
    pub fn with_cache(mut self, cache: AuditCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &AuditCache {
        &self.cache
    }

    /// Ask the running batch to stop. Files already in flight finish; the
    /// rest are reported as cancelled.
    pub fn cancel(&self) {
        info!("cancellation requested");
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn begin_batch(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }

    /// Run `op` over `files` in windows of the configured concurrency.
    ///
    /// Cancellation is checked before each window. Returns the results of the
    /// files that ran, in input order, and the number that did not.
    async fn run_windowed<'a, T, F, Fut>(&self, files: &'a [SourceFile], op: F) -> (Vec<T>, usize)
    where
        F: Fn(&'a SourceFile) -> Fut,
        Fut: Future<Output = T>,
    {
        let window = self.settings.effective_concurrency();
        let mut results = Vec::with_capacity(files.len());

        for chunk in files.chunks(window) {
            if self.is_cancelled() {
                let remaining = files.len() - results.len();
                info!(remaining, "batch cancelled");
                return (results, remaining);
            }
            results.extend(join_all(chunk.iter().map(&op)).await);
        }

        (results, 0)
    }

    /// `--since` bounds by committer date; the log reports author dates.
    async fn commits(&self, path: &str, query: &LogQuery) -> Vec<CommitInfo> {
        let commits = self.vcs.log(path, query).await.unwrap_or_else(|e| {
            warn!(path, error = %e, "history query failed");
            Vec::new()
        });
        filter_commits_by_date(commits, query.since.as_deref(), None)
    }

    async fn diff(&self, path: &str, target: &DiffTarget) -> String {
        self.vcs.diff(path, target).await.unwrap_or_else(|e| {
            warn!(path, ?target, error = %e, "diff query failed");
            String::new()
        })
    }

    /// Documentation audit for a single file.
    pub async fn audit_file(&self, file: &SourceFile) -> CoreResult<AuditResult> {
        let _guard = self.in_flight.acquire(&file.path)?;
        Ok(analyze_file(
            self.vcs.as_ref(),
            &file.path,
            &file.content,
            &self.settings.skip_keywords,
            &self.cache,
        )
        .await)
    }

    /// Audit every file for documentation and marker findings.
    ///
    /// Files with uncommitted changes are left out and listed separately.
    /// Files matching neither include pattern count as skipped.
    pub async fn scan(&self, files: &[SourceFile]) -> ScanReport {
        self.begin_batch();

        let uncommitted = self.vcs.uncommitted_paths().await.unwrap_or_else(|e| {
            warn!(error = %e, "could not list uncommitted files");
            Vec::new()
        });

        let mut report = ScanReport::default();
        let mut committed = Vec::with_capacity(files.len());
        for file in files {
            if uncommitted.iter().any(|p| p == &file.path) {
                report.summary.skipped += 1;
                report.uncommitted.push(file.path.clone());
            } else {
                committed.push(file.clone());
            }
        }

        let (results, cancelled) = self.run_windowed(&committed, |file| self.scan_file(file)).await;
        report.summary.cancelled = cancelled;

        for (file, result) in committed.iter().zip(results) {
            match result {
                Ok(Some(findings)) => {
                    report.summary.succeeded += 1;
                    report.findings.extend(findings);
                }
                Ok(None) => report.summary.skipped += 1,
                Err(e) => {
                    warn!(path = %file.path, error = %e, "scan failed");
                    report.summary.failed += 1;
                }
            }
        }

        // Stable: file order is kept within each severity.
        report.findings.sort_by_key(|f| f.severity);
        info!(
            findings = report.findings.len(),
            succeeded = report.summary.succeeded,
            failed = report.summary.failed,
            skipped = report.summary.skipped,
            cancelled = report.summary.cancelled,
            "scan finished"
        );
        report
    }

    /// Findings for one file, or `None` when no include pattern matches it.
    async fn scan_file(&self, file: &SourceFile) -> CoreResult<Option<Vec<Finding>>> {
        let wants_docs = self.settings.wants_docs(&file.path)?;
        let wants_markers = self.settings.wants_markers(&file.path)?;
        if !wants_docs && !wants_markers {
            return Ok(None);
        }

        let _guard = self.in_flight.acquire(&file.path)?;
        let rule = self.settings.rule_for(&file.path)?;
        let boundary = match rule {
            Some(rule) => rule.header_boundary()?,
            None => None,
        };
        let mut findings = Vec::new();

        if wants_docs {
            let audit = analyze_file(
                self.vcs.as_ref(),
                &file.path,
                &file.content,
                &self.settings.skip_keywords,
                &self.cache,
            )
            .await;

            if audit.needs_attention() {
                let (label, severity) = match audit.status {
                    DocStatus::NoHeader => ("Missing Header", Severity::Error),
                    _ => ("Outdated Documentation", Severity::Warning),
                };
                findings.push(Finding {
                    file_path: file.path.clone(),
                    label: label.to_string(),
                    severity,
                    reason: audit.reason,
                });
            }

            if let Some(missing) = scan_missing_dates(
                self.vcs.as_ref(),
                &file.path,
                &file.content,
                FindingKind::Documentation,
                self.settings.scan_mode,
                &self.settings.skip_keywords,
                boundary.as_ref(),
            )
            .await
            {
                findings.push(Finding {
                    file_path: missing.file_path,
                    label: "Missing Documentation".to_string(),
                    severity: Severity::Warning,
                    reason: missing.reason,
                });
            }
        }

        if wants_markers {
            if let Some(missing) = scan_missing_dates(
                self.vcs.as_ref(),
                &file.path,
                &file.content,
                FindingKind::Marker,
                self.settings.scan_mode,
                &self.settings.skip_keywords,
                boundary.as_ref(),
            )
            .await
            {
                let label = rule
                    .and_then(|r| r.message.as_deref())
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or("Missing Markers");
                findings.push(Finding {
                    file_path: missing.file_path,
                    label: label.to_string(),
                    severity: Severity::Warning,
                    reason: missing.reason,
                });
            }
        }

        Ok(Some(findings))
    }

    /// Wrap the file's pending changes in markers, stamped with today's date.
    pub async fn fix_markers(&self, file: &SourceFile) -> CoreResult<FixOutcome> {
        self.fix_markers_on(file, Utc::now().date_naive()).await
    }

    /// [`Workspace::fix_markers`] with an explicit date for the ticket id.
    ///
    /// Uses the working-tree diff, or the last commit's diff when the working
    /// tree is clean. The ticket is `MOD-YYMMDD`; the sign is the first five
    /// characters of the last commit author, upper-cased, or `AI`.
    pub async fn fix_markers_on(&self, file: &SourceFile, today: NaiveDate) -> CoreResult<FixOutcome> {
        let _guard = self.in_flight.acquire(&file.path)?;

        let mut diff = self.diff(&file.path, &DiffTarget::WorkingTree).await;
        if diff.trim().is_empty() {
            diff = self.diff(&file.path, &DiffTarget::LastCommit).await;
        }
        if diff.trim().is_empty() {
            debug!(path = %file.path, "no changes to mark");
            return Ok(FixOutcome::NoChanges);
        }

        let sign = self
            .commits(&file.path, &LogQuery::latest(1))
            .await
            .first()
            .map(|c| c.author.trim().chars().take(SIGN_LEN).collect::<String>().to_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SIGN.to_string());
        let ticket_id = format!("MOD-{}", today.format("%y%m%d"));

        let patched = ensure_markers_with(
            &file.content,
            &diff,
            &ticket_id,
            &sign,
            &self.settings.reconcile_options(),
        );

        if patched == file.content {
            return Ok(FixOutcome::Unchanged);
        }
        info!(path = %file.path, ticket = %ticket_id, %sign, "markers applied");
        Ok(FixOutcome::Patched {
            content: patched,
            ticket_id,
            sign,
        })
    }

    /// [`Workspace::fix_markers`] over every file matching the marker include
    /// pattern.
    pub async fn fix_all(&self, files: &[SourceFile]) -> BatchOutput {
        self.begin_batch();
        let today = Utc::now().date_naive();

        let (results, cancelled) = self
            .run_windowed(files, |file| async move {
                match self.settings.wants_markers(&file.path) {
                    Ok(true) => self.fix_markers_on(file, today).await.map(Some),
                    Ok(false) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await;

        let mut output = BatchOutput {
            auto_apply: self.settings.auto_apply,
            ..BatchOutput::default()
        };
        output.summary.cancelled = cancelled;
        for (file, result) in files.iter().zip(results) {
            match result {
                Ok(Some(FixOutcome::Patched { content, .. })) => {
                    output.summary.succeeded += 1;
                    output.files.push(UpdatedFile {
                        file_path: file.path.clone(),
                        content,
                    });
                }
                Ok(Some(_)) => output.summary.succeeded += 1,
                Ok(None) => output.summary.skipped += 1,
                Err(e) => {
                    warn!(path = %file.path, error = %e, "fixing markers failed");
                    output.summary.failed += 1;
                }
            }
        }

        info!(patched = output.files.len(), failed = output.summary.failed, "marker batch finished");
        output
    }

    /// Rebuild the whole marker layer of a file from blame.
    ///
    /// Needs a marker rule for the path. Returns `None` when the result equals
    /// the current content or blame is unavailable.
    pub async fn regenerate_file_markers(&self, file: &SourceFile) -> CoreResult<Option<String>> {
        let rule = self
            .settings
            .rule_for(&file.path)?
            .ok_or_else(|| CoreError::NoRule(file.path.clone()))?;
        let boundary = rule.header_boundary()?;
        let _guard = self.in_flight.acquire(&file.path)?;

        let query = match (self.settings.scan_mode, latest_marker_date(&file.content, boundary.as_ref())) {
            (ScanMode::Incremental, Some(date)) => LogQuery::since(date),
            _ => LogQuery::default(),
        };
        let commits = filter_skipped_commits(self.commits(&file.path, &query).await, &self.settings.skip_keywords);
        let labels = build_commit_labels(&commits);

        let blame = match self.vcs.blame(&file.path).await {
            Ok(b) if !b.is_empty() => b,
            Ok(_) => return Ok(None),
            Err(e) => {
                warn!(path = %file.path, error = %e, "blame unavailable");
                return Ok(None);
            }
        };

        let options = AnnotateOptions {
            header_boundary: boundary.as_ref(),
            inline_skip_keywords: &rule.skip_keywords,
            scan_mode: self.settings.scan_mode,
        };
        let regenerated = regenerate_markers(&blame, &labels, &options);

        debug!(path = %file.path, commits = commits.len(), "markers regenerated");
        Ok((regenerated != file.content).then_some(regenerated))
    }

    /// Regenerate documentation for one file.
    pub async fn generate_docs(&self, file: &SourceFile) -> CoreResult<DocOutcome> {
        self.begin_batch();
        self.generate_one(file).await
    }

    async fn generate_one(&self, file: &SourceFile) -> CoreResult<DocOutcome> {
        let generator = self.generator.as_ref().ok_or(CoreError::NoGenerator)?;
        let _guard = self.in_flight.acquire(&file.path)?;

        let query = match header_date(&file.content) {
            Some(date) => LogQuery::since(date),
            None => LogQuery::latest(NO_HEADER_LOG_LIMIT),
        };
        let commits = self.commits(&file.path, &query).await;

        let mut forensic = Vec::new();
        for commit in commits.into_iter().take(MAX_FORENSIC_COMMITS) {
            let diff = self.diff(&file.path, &DiffTarget::Commit(commit.hash.clone())).await;
            if diff.trim().is_empty() {
                continue;
            }
            forensic.push(ForensicCommit { commit, diff });
        }

        if forensic.is_empty() {
            debug!(path = %file.path, "no new commits to document");
            return Ok(DocOutcome::Skipped);
        }

        let prompt = build_prompt(file.file_name(), &forensic_summary(&forensic), &file.content);
        let policy = RetryPolicy::default().with_max_attempts(self.settings.max_retries);
        let text = generate_with_retry(
            generator.as_ref(),
            &self.settings.model,
            &prompt,
            &policy,
            &self.cancelled,
        )
        .await?;

        self.cache.invalidate(&file.path);
        info!(path = %file.path, commits = forensic.len(), "documentation generated");
        Ok(DocOutcome::Generated(clean_response(&text)))
    }

    /// Regenerate documentation for every file matching the docs include
    /// pattern. A failure only affects its own file.
    pub async fn generate_all(&self, files: &[SourceFile]) -> CoreResult<BatchOutput> {
        if self.generator.is_none() {
            return Err(CoreError::NoGenerator);
        }
        self.begin_batch();

        let (results, cancelled) = self
            .run_windowed(files, |file| async move {
                match self.settings.wants_docs(&file.path) {
                    Ok(true) => self.generate_one(file).await.map(Some),
                    Ok(false) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await;

        let mut output = BatchOutput {
            auto_apply: self.settings.auto_apply,
            ..BatchOutput::default()
        };
        output.summary.cancelled = cancelled;
        for (file, result) in files.iter().zip(results) {
            match result {
                Ok(Some(DocOutcome::Generated(content))) => {
                    output.summary.succeeded += 1;
                    output.files.push(UpdatedFile {
                        file_path: file.path.clone(),
                        content,
                    });
                }
                Ok(Some(DocOutcome::Skipped)) | Ok(None) => output.summary.skipped += 1,
                Err(CoreError::Generation(GenerationError::Cancelled)) => output.summary.cancelled += 1,
                Err(e) => {
                    warn!(path = %file.path, error = %e, "documentation failed");
                    output.summary.failed += 1;
                }
            }
        }

        info!(
            succeeded = output.summary.succeeded,
            failed = output.summary.failed,
            skipped = output.summary.skipped,
            cancelled = output.summary.cancelled,
            "documentation batch finished"
        );
        Ok(output)
    }
}
