//! Session Logic Task Implementation
//!
//! Contains the `SessionLogicTask` struct and its event loop.

use super::handlers::SessionHandlers;
use super::state::{SessionState, SessionStats};
use pubchat_core::{
    AppEvent, AppEventSender, ChatError, ChatResult, Command, CommandReceiver, Effect,
    EffectSender, Event, EventReceiver, PublishError, PublisherStats, SessionConfig,
    StoreObserver, Timestamp,
};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

// ----------------------------------------------------------------------------
// Session Logic Task
// ----------------------------------------------------------------------------

/// The task that owns the session's state and processes every command and event
pub struct SessionLogicTask {
    state: SessionState,
    /// Commands from the UI
    command_receiver: CommandReceiver,
    /// Events from transport tasks
    event_receiver: EventReceiver,
    /// Effects to transport tasks
    effect_sender: EffectSender,
    /// App events to the UI
    app_event_sender: AppEventSender,
    running: bool,
}

impl SessionLogicTask {
    pub fn new(
        config: SessionConfig,
        command_receiver: CommandReceiver,
        event_receiver: EventReceiver,
        effect_sender: EffectSender,
        app_event_sender: AppEventSender,
    ) -> ChatResult<Self> {
        Ok(Self {
            state: SessionState::new(config)?,
            command_receiver,
            event_receiver,
            effect_sender,
            app_event_sender,
            running: true,
        })
    }

    /// Observer on the store this task owns; hand it out before `run`
    pub fn store_observer(&self) -> StoreObserver {
        self.state.store.subscribe()
    }

    /// Connection state reported by the transports; hand it out before `run`
    pub fn connection_observer(&self) -> watch::Receiver<bool> {
        self.state.connection.subscribe()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.state.stats
    }

    pub fn publisher_stats(&self) -> &PublisherStats {
        self.state.publisher.stats()
    }

    /// Publishes handed to a transport and not yet completed
    pub fn pending_publishes(&self) -> usize {
        self.state.publisher.pending_count()
    }

    /// Run the session loop until shutdown or until every command sender is gone
    pub async fn run(&mut self) -> ChatResult<()> {
        info!(
            channel = %self.state.config.channel,
            client_id = %self.state.config.client_id,
            "Session task starting"
        );

        let (effects, app_events) = SessionHandlers::handle_bind(&mut self.state)?;
        self.dispatch(effects, app_events);

        let mut events_open = true;

        while self.running {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(cmd) => {
                            if let Err(e) = self.process_command(cmd) {
                                if Self::is_fatal(&e) {
                                    error!("Fatal error processing command: {}", e);
                                    break;
                                }
                                error!("Error processing command: {}", e);
                            }
                        }
                        None => {
                            info!("Command channel closed, shutting down");
                            break;
                        }
                    }
                }

                event = self.event_receiver.recv(), if events_open => {
                    match event {
                        Some(evt) => {
                            if let Err(e) = self.process_event(evt) {
                                if Self::is_fatal(&e) {
                                    error!("Fatal error processing event: {}", e);
                                    break;
                                }
                                warn!("Error processing event: {}", e);
                            }
                        }
                        None => {
                            // Every transport has stopped; keep serving the UI
                            warn!("Event channel closed, no transport is running");
                            events_open = false;
                        }
                    }
                }
            }
        }

        let stats = &self.state.stats;
        let uptime_ms = Timestamp::now()
            .as_millis()
            .saturating_sub(self.state.start_time.as_millis());
        info!(
            uptime_ms,
            messages = self.state.store.len(),
            commands = stats.commands_processed,
            events = stats.events_processed,
            published = self.state.publisher.stats().published,
            pending = self.state.publisher.pending_count(),
            "Session task stopped"
        );
        Ok(())
    }

    fn process_command(&mut self, command: Command) -> ChatResult<()> {
        self.state.stats.commands_processed += 1;
        match command {
            Command::Publish { text } => {
                let (effects, app_events) = SessionHandlers::handle_publish(&mut self.state, &text);
                self.dispatch(effects, app_events);
            }
            Command::Shutdown => {
                info!("Shutdown requested");
                self.running = false;
            }
        }
        Ok(())
    }

    fn process_event(&mut self, event: Event) -> ChatResult<()> {
        self.state.stats.events_processed += 1;
        match event {
            Event::MessageReceived {
                channel,
                payload,
                token,
            } => {
                let (effects, app_events) = SessionHandlers::handle_message_received(
                    &mut self.state,
                    &channel,
                    &payload,
                    token,
                )?;
                self.dispatch(effects, app_events);
            }
            Event::Status(status) => SessionHandlers::handle_status(&mut self.state, &status),
            Event::PublishCompleted { publish_id, result } => {
                SessionHandlers::handle_publish_completed(&mut self.state, publish_id, &result)
            }
        }
        Ok(())
    }

    fn is_fatal(error: &ChatError) -> bool {
        matches!(
            error,
            ChatError::Channel { .. } | ChatError::Configuration { .. }
        )
    }

    /// Send effects to transports and app events to the UI without blocking
    fn dispatch(&mut self, effects: Vec<Effect>, app_events: Vec<AppEvent>) {
        for effect in effects {
            match self.effect_sender.send(effect) {
                Ok(_) => self.state.stats.effects_sent += 1,
                Err(e) => {
                    warn!("No transport to receive effect: {:?}", e.0);
                    // Nothing will ever complete this publish
                    if let Effect::Publish { publish_id, .. } = e.0 {
                        self.state.publisher.complete(
                            publish_id,
                            &Err(PublishError::RequestFailed {
                                reason: "no transport running".to_string(),
                            }),
                        );
                    }
                }
            }
        }

        for app_event in app_events {
            match self.app_event_sender.try_send(app_event) {
                Ok(()) => self.state.stats.app_events_sent += 1,
                Err(TrySendError::Full(_)) => {
                    // The snapshot watch still carries the state
                    self.state.stats.app_events_dropped += 1;
                    debug!("App event channel full, dropping app event");
                }
                Err(TrySendError::Closed(_)) => {
                    self.state.stats.app_events_dropped += 1;
                }
            }
        }
    }
}
