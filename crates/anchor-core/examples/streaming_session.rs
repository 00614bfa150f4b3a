//! Streaming session example
//!
//! Drives a headless editor through one AI generation: content streams in, the menu follows
//! it frame by frame, generation finishes and the anchor settles on the last block.
//!
//! Run with `RUST_LOG=anchor_core=trace` to see the tracker's decisions.

use anchor_core::{
    AiStatus, AnchorConfig, AnchorTarget, ContentTracker, EditorView, HeadlessHost, MenuPresenter,
    MenuSession, Rect, SelectionTracker,
};
use std::rc::Rc;

struct PrintingPresenter {
    host: Rc<HeadlessHost>,
}

impl MenuPresenter for PrintingPresenter {
    fn set_anchor(&self, target: AnchorTarget) {
        println!("  anchor -> {:?}", target.rect(&*self.host));
    }

    fn set_visible(&self, visible: bool) {
        println!("  visible -> {visible}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = AnchorConfig::from_json_str(
        r#"{ "anchor_to_content": true, "anchor_to_selection": true }"#,
    )
    .unwrap_or_default();

    let host = Rc::new(HeadlessHost::new(Rect::new(0.0, 0.0, 720.0, 900.0)));
    let session = Rc::new(MenuSession::new(host.clone(), &config));
    let presenter = Rc::new(PrintingPresenter { host: host.clone() });

    let content = ContentTracker::attach(
        session.clone(),
        presenter.clone(),
        config.content_options(true),
    );
    let selection = SelectionTracker::attach(
        session.clone(),
        presenter.clone(),
        config.selection_options(true),
    );

    println!("1. Generation starts:");
    host.set_ai_status(AiStatus::Loading);
    let paragraph = host.append_node(host.root(), Rect::new(0.0, 120.0, 680.0, 20.0));
    host.mark_ai(paragraph);
    host.emit_transaction();
    println!("  pending frames: {}", host.pending_frame_count());
    host.run_frame();

    println!("\n2. Text streams in (three reflows, one frame):");
    for height in [40.0, 60.0, 80.0] {
        host.set_rect(paragraph, Rect::new(0.0, 120.0, 680.0, height));
    }
    host.run_frame();
    println!("  recomputations so far: {}", content.recompute_count());

    println!("\n3. User scrolls, no signal needed:");
    host.scroll_by(0.0, -100.0);
    if let Some(anchor) = content.streaming_anchor() {
        println!("  streaming anchor now at {:?}", anchor.rect());
    }

    println!("\n4. Generation finishes:");
    host.set_ai_status(AiStatus::Done);
    host.emit_transaction();
    println!("  mode: {:?}", content.mode());

    println!("\n5. Unmount and reset:");
    drop(content);
    drop(selection);
    let swept = session.reset();
    println!(
        "  swept {swept} orphaned markers, {} still attached",
        host.live_marker_count()
    );
}
