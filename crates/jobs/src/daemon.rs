use std::sync::Arc;

use autofilter_application::ports::{BotStorePort, LogSource, ReloadSignalPort, ReverseDnsPort};
use autofilter_application::DetectWindowUseCase;
use autofilter_domain::{BotSet, ConfigTables, CountsWindow, LogLine};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::reload_controller::ReloadController;

/// The single cooperative task described in §5: tail → aggregate → (on
/// window close) detect → persist → maybe-signal, in strict sequence.
pub struct AutofilterDaemon {
    log_source: Box<dyn LogSource>,
    reverse_dns: Arc<dyn ReverseDnsPort>,
    bot_store: Arc<dyn BotStorePort>,
    reload_signal: Arc<dyn ReloadSignalPort>,
    tables: ConfigTables,
    dry_run: bool,
    shutdown: CancellationToken,
}

impl AutofilterDaemon {
    pub fn new(
        log_source: Box<dyn LogSource>,
        reverse_dns: Arc<dyn ReverseDnsPort>,
        bot_store: Arc<dyn BotStorePort>,
        reload_signal: Arc<dyn ReloadSignalPort>,
        tables: ConfigTables,
        dry_run: bool,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            log_source,
            reverse_dns,
            bot_store,
            reload_signal,
            tables,
            dry_run,
            shutdown,
        }
    }

    /// Runs until the shutdown token fires, then returns. Per §5, no
    /// in-flight (not-yet-closed) window is flushed on shutdown.
    pub async fn run(mut self) {
        let mut reload_controller = ReloadController::new();
        let mut current_prefix: Option<String> = None;
        let mut current_window = CountsWindow::new();

        loop {
            if self.shutdown.is_cancelled() {
                info!("shutdown requested, exiting before next read");
                return;
            }

            let raw = match self.log_source.next_line(&self.shutdown).await {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    info!("log source exhausted by shutdown");
                    return;
                }
                Err(err) => {
                    error!(error = %err, "log read failed, continuing");
                    continue;
                }
            };

            let line = match LogLine::parse(&raw) {
                Ok(line) => line,
                Err(err) => {
                    warn!(error = %err, "malformed log line, skipping");
                    continue;
                }
            };

            let Some(prefix) = line.window_key() else {
                warn!("log line has unparsable time prefix, skipping");
                continue;
            };

            match &current_prefix {
                Some(existing) if *existing == prefix => {}
                Some(_) => {
                    self.close_window(&current_window, &mut reload_controller)
                        .await;
                    current_window = CountsWindow::new();
                    current_prefix = Some(prefix);
                }
                None => {
                    current_prefix = Some(prefix);
                }
            }

            current_window.record(&line);
        }
    }

    async fn close_window(&self, window: &CountsWindow, reload_controller: &mut ReloadController) {
        if window.is_empty() {
            return;
        }

        let now = Utc::now().timestamp();
        let mut bot_set = match self.bot_store.load(now).await {
            Ok(set) => set,
            Err(err) => {
                error!(error = %err, "failed to load bot store, treating as empty");
                BotSet::new()
            }
        };
        bot_set.expire(now);

        let outcome = DetectWindowUseCase::run(
            window,
            &bot_set,
            &self.tables,
            self.reverse_dns.as_ref(),
            now,
        )
        .await;

        for record in outcome.new_records {
            bot_set.upsert(record);
        }

        if self.dry_run {
            info!(
                bot_set_size = bot_set.len(),
                "dry run: window closed, persistence and signaling suppressed"
            );
            return;
        }

        if let Err(err) = self.bot_store.persist(&bot_set).await {
            error!(error = %err, "failed to persist bot store");
            return;
        }

        reload_controller
            .maybe_signal(bot_set.addresses(), now, self.reload_signal.as_ref())
            .await;
    }
}
