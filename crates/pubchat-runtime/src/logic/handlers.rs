//! Session Command and Event Handlers
//!
//! Each handler mutates the session state and returns the effects for the
//! transports and the app events for the UI.

use super::state::SessionState;
use pubchat_core::{
    AppEvent, ChannelName, ChatResult, DeliveryToken, Effect, PublishError, PublishId,
    StatusEvent,
};
use serde_json::Value;
use tracing::debug;

/// Command and event handlers for the session loop
pub struct SessionHandlers;

impl SessionHandlers {
    /// Bind the listener to the configured channel
    pub fn handle_bind(state: &mut SessionState) -> ChatResult<(Vec<Effect>, Vec<AppEvent>)> {
        let channel = state.config.channel.clone();
        let subscribe = state
            .listener
            .bind(channel.clone(), state.config.with_presence)?;

        Ok((vec![subscribe], vec![AppEvent::SessionBound { channel }]))
    }

    /// Handle publish command
    pub fn handle_publish(state: &mut SessionState, text: &str) -> (Vec<Effect>, Vec<AppEvent>) {
        // Nothing is appended here: the message arrives via the subscription echo
        let effects = state.publisher.publish(text).into_iter().collect();
        (effects, Vec::new())
    }

    /// Handle an inbound payload from the transport
    pub fn handle_message_received(
        state: &mut SessionState,
        channel: &ChannelName,
        payload: &Value,
        token: Option<DeliveryToken>,
    ) -> ChatResult<(Vec<Effect>, Vec<AppEvent>)> {
        let Some(message) = state.listener.handle_message(channel, payload) else {
            return Ok((Vec::new(), Vec::new()));
        };

        debug!(
            message_id = %message.id,
            token = ?token.map(|t| t.as_u64()),
            "Appending received message"
        );
        state.store.append(message.clone())?;

        Ok((Vec::new(), vec![AppEvent::MessageAppended { message }]))
    }

    /// Handle a transport status change
    pub fn handle_status(state: &mut SessionState, status: &StatusEvent) {
        state.listener.handle_status(status);
        state.connection.send_replace(state.listener.is_connected());
    }

    /// Handle completion of an earlier publish
    pub fn handle_publish_completed(
        state: &mut SessionState,
        publish_id: PublishId,
        result: &Result<DeliveryToken, PublishError>,
    ) {
        state.publisher.complete(publish_id, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pubchat_core::SessionConfig;
    use serde_json::json;

    fn bound_state() -> SessionState {
        let mut state = SessionState::new(SessionConfig::testing("the_guide")).unwrap();
        SessionHandlers::handle_bind(&mut state).unwrap();
        state
    }

    #[test]
    fn bind_emits_subscribe_and_session_bound() {
        let mut state = SessionState::new(SessionConfig::testing("the_guide")).unwrap();
        let (effects, app_events) = SessionHandlers::handle_bind(&mut state).unwrap();

        assert!(matches!(
            effects.as_slice(),
            [Effect::Subscribe { with_presence: true, .. }]
        ));
        assert!(matches!(
            app_events.as_slice(),
            [AppEvent::SessionBound { .. }]
        ));
        assert!(SessionHandlers::handle_bind(&mut state).is_err());
    }

    #[test]
    fn publish_does_not_touch_store() {
        let mut state = bound_state();
        let (effects, app_events) = SessionHandlers::handle_publish(&mut state, "hello");

        assert_eq!(effects.len(), 1);
        assert!(app_events.is_empty());
        assert!(state.store.is_empty());
    }

    #[test]
    fn blank_publish_is_a_no_op() {
        let mut state = bound_state();
        let (effects, _) = SessionHandlers::handle_publish(&mut state, "   ");
        assert!(effects.is_empty());
    }

    #[test]
    fn received_message_is_appended() {
        let mut state = bound_state();
        let channel = state.config.channel.clone();

        let (_, app_events) = SessionHandlers::handle_message_received(
            &mut state,
            &channel,
            &json!({"update": "hi", "entry": "Alice"}),
            Some(DeliveryToken::new(1)),
        )
        .unwrap();

        assert_eq!(state.store.len(), 1);
        assert!(matches!(
            app_events.as_slice(),
            [AppEvent::MessageAppended { .. }]
        ));
    }

    #[test]
    fn undecodable_message_is_dropped() {
        let mut state = bound_state();
        let channel = state.config.channel.clone();

        let (_, app_events) = SessionHandlers::handle_message_received(
            &mut state,
            &channel,
            &json!({"entry": "Bob"}),
            None,
        )
        .unwrap();

        assert!(state.store.is_empty());
        assert!(app_events.is_empty());
    }

    #[test]
    fn status_drives_connection_watch() {
        let mut state = bound_state();
        let connection = state.connection.subscribe();
        assert!(!*connection.borrow());

        SessionHandlers::handle_status(&mut state, &StatusEvent::Connected(true));
        assert!(*connection.borrow());

        SessionHandlers::handle_status(&mut state, &StatusEvent::Error("timeout".into()));
        assert!(*connection.borrow());

        SessionHandlers::handle_status(&mut state, &StatusEvent::Connected(false));
        assert!(!*connection.borrow());
    }
}
