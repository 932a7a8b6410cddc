use crate::config::{HandlerSettings, ANALYZE_ROUTE};
use crate::error::Result;
use crate::form::FormData;
use crate::models::AnalyzeResponse;
use crate::render::{Fragment, RenderTarget};
use crate::transport::Transport;
use std::sync::atomic::{AtomicU64, Ordering};

/// A form submission, as delivered to [`SubmissionHandler::on_submit`].
#[derive(Debug, Clone)]
pub struct SubmitEvent {
    form: FormData,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new(form: FormData) -> SubmitEvent {
        SubmitEvent {
            form,
            default_prevented: false,
        }
    }

    /// Stop the native submission (navigation to the form's action).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The result container now shows this fragment
    Rendered(Fragment),
    /// A newer submission started before this one settled; nothing was rendered
    Stale { generation: u64 },
}

/// Forwards submitted forms to the analysis endpoint and shows the result.
///
/// Every call to [`on_submit`](SubmissionHandler::on_submit) issues exactly one
/// request and, unless it went stale, replaces the target's contents exactly
/// once. Failures never escape the handler.
pub struct SubmissionHandler<T, R> {
    transport: T,
    target: R,
    settings: HandlerSettings,
    generation: AtomicU64,
}

impl<T, R> SubmissionHandler<T, R>
where
    T: Transport,
    R: RenderTarget,
{
    pub fn new(transport: T, target: R, settings: HandlerSettings) -> SubmissionHandler<T, R> {
        SubmissionHandler {
            transport,
            target,
            settings,
            generation: AtomicU64::new(0),
        }
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub async fn on_submit(&self, event: &mut SubmitEvent) -> SubmitOutcome {
        event.prevent_default();

        let form = event.form().clone();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let fragment = match self.request(form).await {
            Ok(response) => Fragment::from(response.outcome()),
            Err(e) => {
                log::error!("Error: {}", e);
                Fragment::GenericError
            }
        };

        let latest = self.generation.load(Ordering::SeqCst);
        if self.settings.discard_stale && latest != generation {
            log::debug!(
                "dropping response of submission {}, submission {} is newer",
                generation,
                latest
            );
            return SubmitOutcome::Stale { generation };
        }

        self.target.replace_contents(fragment.to_html());
        SubmitOutcome::Rendered(fragment)
    }

    async fn request(&self, form: FormData) -> Result<AnalyzeResponse> {
        let body = self.transport.post_form(ANALYZE_ROUTE, form).await?;
        AnalyzeResponse::from_slice(&body)
    }
}
