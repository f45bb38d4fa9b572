use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use malo::audio::recorder::decode_wav;
use malo::audio::VoiceRecorder;
use malo::catalog::MenuCatalog;
use malo::config::KioskConfig;
use malo::kernel::event::Event;
use malo::kernel::reactor::{Reactor, ReactorConfig};
use malo::kernel::router::RouteParams;
use malo::kernel::scheduler::SideEffect;
use malo::kernel::time::TICK_MS;
use malo::outputs::chat::Role;
use malo::outputs::{LoggingScreenRouter, ScreenRouter};
use malo::turn::normalizer::{normalize_size, normalize_temperature};
use malo::turn::types::SlotSet;
use malo::services::backend::{ConversationClient, TurnDispatcher};

// Console input, parsed off the reactor thread
enum Console {
    Kernel(Event),
    Voice(String),
    ShowCart,
    Quit,
}

fn parse_console(line: &str) -> Option<Console> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
    let arg = arg.trim();
    Some(match command {
        "/quit" | "/exit" => Console::Quit,
        "/cart" => Console::ShowCart,
        "/dismiss" => Console::Kernel(Event::ModalDismissed),
        "/tap" if !arg.is_empty() => Console::Kernel(Event::ItemTapped {
            item_id: arg.to_string(),
        }),
        "/temp" if !arg.is_empty() => Console::Kernel(Event::SelectionMade(SlotSet {
            temperature: Some(normalize_temperature(arg)),
            ..SlotSet::default()
        })),
        "/size" if !arg.is_empty() => Console::Kernel(Event::SelectionMade(SlotSet {
            size: Some(normalize_size(arg)),
            ..SlotSet::default()
        })),
        "/voice" if !arg.is_empty() => Console::Voice(arg.to_string()),
        _ => Console::Kernel(Event::text(line)),
    })
}

/// Runs a WAV file through the recorder as if it had been spoken.
async fn record_file(recorder: &mut VoiceRecorder, path: &str) -> Event {
    let outcome = async {
        let bytes = tokio::fs::read(path).await?;
        let (samples, rate) = decode_wav(&bytes)?;
        if rate != recorder.sample_rate() {
            tracing::warn!(file_rate = rate, "clip sample rate differs from recorder");
        }
        recorder.start(true)?;
        recorder.push_samples(&samples)?;
        Ok::<_, anyhow::Error>(recorder.stop()?)
    }
    .await;

    match outcome {
        Ok(wav) => Event::VoiceCaptured(wav),
        Err(e) => {
            recorder.reset();
            tracing::warn!("voice capture failed: {}", e);
            let message = match e.downcast_ref::<malo::AudioError>() {
                Some(audio) => audio.to_string(),
                None => malo::outputs::chat::VOICE_SEND_FAILED.to_string(),
            };
            Event::VoiceFailed(message)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = KioskConfig::from_env();
    tracing::info!(backend = %config.backend_url, "kiosk booting");

    // Kernel channel: backend results re-enter here
    let (tx, mut rx) = mpsc::channel::<Event>(100);
    let (console_tx, mut console_rx) = mpsc::channel::<Console>(16);

    let catalog = Arc::new(MenuCatalog::kiosk_default());
    let mut reactor = Reactor::new(ReactorConfig::from(&config), catalog)?;
    let client = Arc::new(ConversationClient::new(&config)?);
    let mut dispatcher = TurnDispatcher::new(Arc::clone(&client), tx.clone());
    let mut router = LoggingScreenRouter::new(reactor.screen);
    let mut recorder = VoiceRecorder::new(config.sample_rate, config.max_recording_secs);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(command) = parse_console(&line) {
                if console_tx.send(command).await.is_err() {
                    break;
                }
            }
        }
    });

    dispatcher.start_session();

    let mut cadence = tokio::time::interval(Duration::from_millis(TICK_MS));
    cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut feedback: Vec<Event> = Vec::new();
    let mut printed = 0usize;
    let mut running = true;

    tracing::info!(
        "kiosk active. Type to talk, /tap <id>, /temp <hot|ice>, /size <tall|grande|venti>, \
         /voice <file.wav>, /cart, /quit"
    );

    while running {
        cadence.tick().await;

        // 1. Drain events: router feedback first, then backend results, then console
        let mut events = std::mem::take(&mut feedback);
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        while let Ok(command) = console_rx.try_recv() {
            match command {
                Console::Kernel(event) => events.push(event),
                Console::Voice(path) => events.push(record_file(&mut recorder, &path).await),
                Console::ShowCart => {
                    let cart = reactor.cart.state();
                    for line in &cart.lines {
                        println!("  {} x{} ({}원)", line.item_name, line.quantity, line.unit_price);
                    }
                    println!("  합계 {}원", cart.total_price());
                }
                Console::Quit => {
                    events.push(Event::Teardown);
                    running = false;
                }
            }
        }

        // 2. Kernel step
        let effects = reactor.tick_step(events);

        // 3. Side effects
        for effect in effects {
            match effect {
                SideEffect::Navigate(screen, params) => {
                    router.navigate(screen, &params);
                    feedback.push(Event::ScreenEntered { screen, params });
                }
                SideEffect::GoBack => {
                    router.go_back();
                    if let Some(screen) = router.current() {
                        feedback.push(Event::ScreenEntered {
                            screen,
                            params: RouteParams::new(),
                        });
                    }
                }
                SideEffect::OpenModal(modal) => router.open_modal(modal),
                SideEffect::CloseModal => router.close_modal(),
                SideEffect::SendText {
                    epoch,
                    session_id,
                    text,
                } => dispatcher.send_text(epoch, session_id, text),
                SideEffect::SendVoice {
                    epoch,
                    session_id,
                    audio,
                    delay_ms,
                } => dispatcher.send_voice(epoch, session_id, audio, delay_ms),
                SideEffect::HighlightStarted(start) => {
                    tracing::info!(element = %start.target, "highlight");
                }
                SideEffect::HighlightCleared(element) => {
                    tracing::debug!(%element, "highlight cleared");
                }
                SideEffect::PlayTts(location) => {
                    tracing::info!(url = %client.resolve_tts_url(&location), "tts ready");
                }
                SideEffect::CancelInFlight => dispatcher.cancel_all(),
            }
        }

        // 4. Transcript
        for message in &reactor.chat.messages()[printed.min(reactor.chat.len())..] {
            let who = match message.role {
                Role::User => "나",
                Role::Assistant => "키오스크",
            };
            println!("[{who}] {}", message.text);
        }
        printed = reactor.chat.len();
    }

    let summary = reactor.telemetry.aggregate_session(reactor.tick.frame);
    tracing::info!(?summary, duration_ms = reactor.session_duration_ms(), "session closed");
    Ok(())
}
