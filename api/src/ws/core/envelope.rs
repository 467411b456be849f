use crate::ws::core::event::Event;
use util::ws::{WebSocketManager, emit as emit_enveloped};

/// Broadcasts `ev` on its own topic; returns how many subscribers got it.
pub async fn emit<E>(ws: &WebSocketManager, ev: &E) -> usize
where
    E: Event,
{
    let topic = ev.topic_path();
    emit_enveloped(ws, &topic, E::NAME, ev).await
}
