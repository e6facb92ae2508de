//! Text dump of replayed panels.

use chat_widgets::config::WidgetConfig;
use chat_widgets::event::{PanelFrame, Session, Transcript};
use chat_widgets::render::{FixedFonts, IconResolver, RecordingSurface};

/// Replay `transcript` and print each panel's lines, newest last.
pub fn dump_transcript(
    transcript: &Transcript,
    config: Option<WidgetConfig>,
    icons: &dyn IconResolver,
    commands: bool,
) {
    let fonts = FixedFonts::default();
    let mut session = Session::replay(transcript, config);
    eprintln!(
        "Replayed {} event(s), rendering at {} ms",
        transcript.events.len(),
        session.now_ms
    );

    for frame in session.panels(&fonts, icons) {
        print_panel(&frame);
        if commands && frame.prepared.is_some() {
            let mut surface = RecordingSurface::new();
            session.render(frame.kind, &fonts, icons, &mut surface);
            for line in surface.dump().lines() {
                println!("    {}", line);
            }
        }
    }
}

fn print_panel(frame: &PanelFrame) {
    let Some(panel) = &frame.prepared else {
        println!("{}: hidden", frame.kind.name());
        return;
    };
    println!(
        "{}: {:?} priority={} width={}{}",
        frame.kind.name(),
        frame.position,
        frame.priority,
        panel.layout.width,
        if panel.merged { " (merged)" } else { "" }
    );
    if panel.lines.is_empty() {
        println!("  (empty)");
    }
    for line in &panel.lines {
        println!("  [{:3}] {}", line.alpha, line.text());
    }
}
