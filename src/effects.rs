//! Runs the network side of the app on a tokio runtime.
//!
//! The app never awaits. It hands out [`Command`]s; the executor spawns a
//! task per command and posts the outcome back into the event queue as a
//! [`NetworkEvent`].

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::api::{JudgeApi, ProfileUpload, SubmissionId, SubmissionRequest, SubmissionStatus};
use crate::error::ClientError;
use crate::poller::{PollProgress, StatusPoller};
use crate::profile::{self, GateDecision};
use crate::runtime::{EventSender, JudgeEvent};
use crate::submission;

/// Work the app asks for.
#[derive(Debug)]
pub enum Command {
    CheckProfile,
    CompleteProfile(ProfileUpload),
    Submit(SubmissionRequest),
    Poll {
        id: SubmissionId,
        cancel: CancellationToken,
    },
}

/// Outcome of a [`Command`], delivered through the event queue.
#[derive(Debug)]
pub enum NetworkEvent {
    ProfileChecked(GateDecision),
    ProfileSaved(Result<(), ClientError>),
    Submitted(Result<SubmissionId, ClientError>),
    PollProgress(PollProgress),
    PollFinished(Result<SubmissionStatus, ClientError>),
}

pub struct Effects {
    handle: Handle,
    api: Arc<dyn JudgeApi>,
    events: EventSender,
    poller: StatusPoller,
}

impl Effects {
    pub fn new(
        handle: Handle,
        api: Arc<dyn JudgeApi>,
        events: EventSender,
        poller: StatusPoller,
    ) -> Self {
        Self {
            handle,
            api,
            events,
            poller,
        }
    }

    pub fn dispatch(&self, command: Command) {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        let post = move |ev: NetworkEvent| {
            // the receiver only goes away when the app is shutting down
            let _ = events.send(JudgeEvent::Network(ev));
        };

        match command {
            Command::CheckProfile => {
                self.handle.spawn(async move {
                    post(NetworkEvent::ProfileChecked(
                        profile::check_profile(api.as_ref()).await,
                    ));
                });
            }
            Command::CompleteProfile(upload) => {
                self.handle.spawn(async move {
                    let result = api.complete_profile(&upload).await;
                    if let Err(err) = &result {
                        tracing::error!(error = %err, "profile upload failed");
                    }
                    post(NetworkEvent::ProfileSaved(result));
                });
            }
            Command::Submit(request) => {
                self.handle.spawn(async move {
                    let result = submission::submit(api.as_ref(), &request).await;
                    if let Err(err) = &result {
                        tracing::error!(error = %err, "submission failed");
                    }
                    post(NetworkEvent::Submitted(result));
                });
            }
            Command::Poll { id, cancel } => {
                let poller = self.poller;
                let progress_events = self.events.clone();
                self.handle.spawn(async move {
                    let result = poller
                        .run(api.as_ref(), &id, cancel, move |p| {
                            let _ = progress_events
                                .send(JudgeEvent::Network(NetworkEvent::PollProgress(p)));
                        })
                        .await;
                    post(NetworkEvent::PollFinished(result));
                });
            }
        }
    }
}
