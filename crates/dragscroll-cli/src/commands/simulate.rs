use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tracing::info;

use dragscroll_core::sim::{DragPath, SimHost, Simulation, Trace};
use dragscroll_core::{
    AppConfig, ElementBound, EventKind, ManualClock, Point, ScrollAxes, ScrollConfig,
    ScrollMetrics, UiMode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventKindArg {
    DragOver,
    MouseMove,
    TouchMove,
}

impl From<EventKindArg> for EventKind {
    fn from(kind: EventKindArg) -> Self {
        match kind {
            EventKindArg::DragOver => EventKind::DragOver,
            EventKindArg::MouseMove => EventKind::MouseMove,
            EventKindArg::TouchMove => EventKind::TouchMove,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AxesArg {
    Vertical,
    Both,
}

impl From<AxesArg> for ScrollAxes {
    fn from(axes: AxesArg) -> Self {
        match axes {
            AxesArg::Vertical => ScrollAxes::Vertical,
            AxesArg::Both => ScrollAxes::Both,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SimulateArgs {
    /// Pointer start, as x,y in viewport pixels
    #[arg(long, default_value = "250,250", value_parser = parse_point)]
    pub from: Point,
    /// Pointer end, as x,y in viewport pixels
    #[arg(long, default_value = "250,495", value_parser = parse_point)]
    pub to: Point,
    /// Time to move from start to end
    #[arg(long, default_value_t = 300)]
    pub duration_ms: u64,
    /// Time to hold the pointer at the end
    #[arg(long, default_value_t = 1000)]
    pub hold_ms: u64,
    /// Gap between pointer events
    #[arg(long, default_value_t = 16)]
    pub event_interval_ms: u64,
    /// Event type the pointer produces
    #[arg(long, value_enum, default_value_t = EventKindArg::DragOver)]
    pub kind: EventKindArg,
    /// Scroll container, as x,y,w,h
    #[arg(long, default_value = "0,0,500,500", value_parser = parse_bound)]
    pub container: ElementBound,
    /// Scrollable content size, as w,h
    #[arg(long, default_value = "500,1000", value_parser = parse_size)]
    pub content: (f64, f64),
    /// Dragged element size, as w,h; it stays centred on the pointer
    #[arg(long, default_value = "100,40", value_parser = parse_size)]
    pub element: (f64, f64),
    /// Viewport height
    #[arg(long, default_value_t = 800.0)]
    pub viewport_height: f64,
    /// Override scroll.strength_multiplier
    #[arg(long)]
    pub multiplier: Option<f64>,
    /// Override scroll.buffer
    #[arg(long)]
    pub buffer: Option<f64>,
    /// Override scroll.axes
    #[arg(long, value_enum)]
    pub axes: Option<AxesArg>,
    /// Pretend to run in mobile mode
    #[arg(long)]
    pub mobile_mode: bool,
    /// Pretend to use the mobile view
    #[arg(long)]
    pub mobile_view: bool,
    /// Print the full trace as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    frames: usize,
    final_scroll_top: f64,
    final_scroll_left: f64,
    total_dx: f64,
    total_dy: f64,
    trace: Trace,
}

pub fn run(config: &AppConfig, args: &SimulateArgs) -> Result<()> {
    let scroll = effective_scroll_config(&config.scroll, args);
    let report = simulate(&scroll, args)?;

    info!(
        frames = report.frames,
        scroll_top = report.final_scroll_top,
        scroll_left = report.final_scroll_left,
        "Simulation finished"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn effective_scroll_config(base: &ScrollConfig, args: &SimulateArgs) -> ScrollConfig {
    let mut scroll = base.clone();
    if let Some(multiplier) = args.multiplier {
        scroll.strength_multiplier = multiplier;
    }
    if let Some(buffer) = args.buffer {
        scroll.buffer = buffer;
    }
    if let Some(axes) = args.axes {
        scroll.axes = axes.into();
    }
    scroll
}

fn simulate(scroll: &ScrollConfig, args: &SimulateArgs) -> Result<Report> {
    let container = args.container;
    let (content_width, content_height) = args.content;
    let metrics = ScrollMetrics {
        scroll_top: 0.0,
        scroll_left: 0.0,
        scroll_height: content_height,
        scroll_width: content_width,
        client_height: container.h,
        client_width: container.w,
    };
    let mode = UiMode {
        mobile_mode: args.mobile_mode,
        mobile_view: args.mobile_view,
    };

    let host = SimHost::with_frame_interval(ManualClock::new(), scroll.frame_interval())
        .with_container(container)
        .with_metrics(metrics)
        .with_viewport_height(args.viewport_height)
        .with_ui_mode(mode);

    let (w, h) = args.element;
    let mut sim = Simulation::new(host, scroll.to_options()?)?.follow_pointer(w, h);
    sim.start();
    sim.run_path(&DragPath {
        from: args.from,
        to: args.to,
        duration: Duration::from_millis(args.duration_ms),
        event_interval: Duration::from_millis(args.event_interval_ms),
        hold: Duration::from_millis(args.hold_ms),
        kind: args.kind.into(),
    });
    sim.stop();

    let trace = sim.trace();
    let metrics = sim.host().metrics();
    Ok(Report {
        frames: trace.samples.len(),
        final_scroll_top: metrics.scroll_top,
        final_scroll_left: metrics.scroll_left,
        total_dx: trace.total_dx(),
        total_dy: trace.total_dy(),
        trace,
    })
}

fn print_report(report: &Report) {
    println!(
        "{:>9}  {:>8}  {:>8}  {:>7}  {:>7}  state",
        "t (ms)", "top", "left", "x", "y"
    );

    let mut last = None;
    for sample in &report.trace.samples {
        // Only print frames where something visible changed
        let key = (sample.scroll_top, sample.scroll_left, sample.state);
        if last == Some(key) {
            continue;
        }
        last = Some(key);
        println!(
            "{:>9.1}  {:>8}  {:>8}  {:>+7.3}  {:>+7.3}  {}",
            sample.t_ms,
            sample.scroll_top,
            sample.scroll_left,
            sample.scale_x,
            sample.scale_y,
            sample.state
        );
    }

    println!(
        "\n{} frames, scrolled dx={} dy={}, final position top={} left={}",
        report.frames,
        report.total_dx,
        report.total_dy,
        report.final_scroll_top,
        report.final_scroll_left
    );
}

fn parse_numbers<const N: usize>(s: &str) -> Result<[f64; N]> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(anyhow!("expected {} comma-separated numbers, got {:?}", N, s));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        let value: f64 = part
            .parse()
            .map_err(|_| anyhow!("{:?} is not a number", part))?;
        if !value.is_finite() {
            return Err(anyhow!("{:?} is not a finite number", part));
        }
        *slot = value;
    }
    Ok(out)
}

fn parse_point(s: &str) -> Result<Point> {
    let [x, y] = parse_numbers::<2>(s)?;
    Ok(Point::new(x, y))
}

fn parse_size(s: &str) -> Result<(f64, f64)> {
    let [w, h] = parse_numbers::<2>(s)?;
    if w < 0.0 || h < 0.0 {
        return Err(anyhow!("sizes cannot be negative: {:?}", s));
    }
    Ok((w, h))
}

fn parse_bound(s: &str) -> Result<ElementBound> {
    let [x, y, w, h] = parse_numbers::<4>(s)?;
    if w < 0.0 || h < 0.0 {
        return Err(anyhow!("sizes cannot be negative: {:?}", s));
    }
    Ok(ElementBound::new(x, y, w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: SimulateArgs,
    }

    fn args(extra: &[&str]) -> SimulateArgs {
        let mut argv = vec!["simulate"];
        argv.extend_from_slice(extra);
        TestCli::parse_from(argv).args
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_point("10, 20").unwrap(), Point::new(10.0, 20.0));
        assert!(parse_point("10").is_err());
        assert!(parse_point("a,b").is_err());
        assert!(parse_size("-1,5").is_err());
        assert_eq!(
            parse_bound("0,0,500,500").unwrap(),
            ElementBound::new(0.0, 0.0, 500.0, 500.0)
        );
    }

    #[test]
    fn test_overrides_applied() {
        let args = args(&["--multiplier", "12", "--axes", "both"]);
        let scroll = effective_scroll_config(&ScrollConfig::default(), &args);
        assert_eq!(scroll.strength_multiplier, 12.0);
        assert_eq!(scroll.axes, ScrollAxes::Both);
        assert_eq!(scroll.buffer, 150.0);
    }

    #[test]
    fn test_default_drag_scrolls_down() {
        let args = args(&[]);
        let report = simulate(&ScrollConfig::default(), &args).unwrap();
        assert!(report.final_scroll_top > 0.0);
        assert!(report.final_scroll_top <= 500.0);
        assert_eq!(report.total_dy, report.final_scroll_top);
        assert_eq!(report.final_scroll_left, 0.0);
    }

    #[test]
    fn test_zero_multiplier_never_scrolls() {
        let args = args(&["--multiplier", "0"]);
        let scroll = effective_scroll_config(&ScrollConfig::default(), &args);
        let report = simulate(&scroll, &args).unwrap();
        assert_eq!(report.final_scroll_top, 0.0);
        assert!(report.trace.changes.is_empty());
    }

    #[test]
    fn test_right_edge_needs_both_axes() {
        let base = ["--to", "500,250", "--content", "1200,1000"];

        let vertical = args(&base);
        let report = simulate(&ScrollConfig::default(), &vertical).unwrap();
        assert_eq!(report.final_scroll_left, 0.0);
        assert_eq!(report.final_scroll_top, 0.0);

        let mut with_both = base.to_vec();
        with_both.extend_from_slice(&["--axes", "both"]);
        let both = args(&with_both);
        let scroll = effective_scroll_config(&ScrollConfig::default(), &both);
        let report = simulate(&scroll, &both).unwrap();
        assert!(report.final_scroll_left > 0.0);
        assert_eq!(report.final_scroll_top, 0.0);
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        let args = args(&["--multiplier=-5"]);
        let scroll = effective_scroll_config(&ScrollConfig::default(), &args);
        assert!(simulate(&scroll, &args).is_err());
    }
}
