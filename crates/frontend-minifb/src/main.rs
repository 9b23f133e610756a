//! PICO-8 GPIO debugger frontend.
//!
//! Provides three execution modes:
//!
//! - **GUI mode** (default): GPIO grid, watch bit rows, and a bit editor in a
//!   scaled window. The window title carries the frame status and the
//!   description of the selected cell.
//! - **Headless mode** (`--headless`): Replay every frame of a document and
//!   print the bit-level diff each frame produces.
//! - **Step mode** (`--step`): Line-oriented command prompt over the same
//!   controls.
//!
//! The host memory is a 32 KB PICO-8 RAM image; the GPIO bank is attached to
//! `ram[base..base + size]`.

use anyhow::{bail, Context, Result};
use clap::Parser;
use gpio_core::{
    bits, debugger, Inspector, InspectorConfig, GPIO_SIZE, HOST_RAM_SIZE,
};
use minifb::{Key, KeyRepeat, Scale, ScaleMode, Window, WindowOptions};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Cells per grid row
const COLS: usize = 16;
/// Cell pitch in unscaled pixels (8 px square + 2 px gap)
const PITCH: usize = 10;
/// Square size inside a pitch
const SQUARE: usize = 8;
/// Outer margin in unscaled pixels
const MARGIN: usize = 4;
/// Height of a bit row (watch rows and the editor row)
const ROW_H: usize = 12;

const COLOR_BG: u32 = 0x10_14_18;
const COLOR_OFF: u32 = 0x2A_2F_36;
const COLOR_ON: u32 = 0x3C_CB_5A;
const COLOR_SELECT: u32 = 0xF2_C9_4C;
const COLOR_EDIT: u32 = 0x4F_A3_F7;

#[derive(Parser, Debug)]
#[command(name = "gpio-debug", version, about = "PICO-8 GPIO debugger")]
struct Cli {
    /// Frame document to load at startup (JSON)
    #[arg(short, long, value_name = "FILE")]
    frames: Option<PathBuf>,

    /// Replay all frames without a window and print per-frame diffs
    #[arg(long, conflicts_with = "step")]
    headless: bool,

    /// Interactive command prompt
    #[arg(long)]
    step: bool,

    /// Print the full bank when headless replay finishes
    #[arg(long)]
    dump: bool,

    /// Initial window scale
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=6))]
    scale: u8,

    /// Number of GPIO cells
    #[arg(long, default_value_t = GPIO_SIZE)]
    size: usize,

    /// Host address of pin 1, hex
    #[arg(long, default_value = "5F80", value_parser = parse_hex_u16)]
    base: u16,

    /// Debug logging
    #[arg(long)]
    debug: bool,
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(s, 16).map_err(|e| format!("{}: {}", s, e))
}

/// End of the GPIO window in host RAM, if a non-empty window fits.
fn gpio_window_end(base: usize, size: usize) -> Option<usize> {
    base.checked_add(size).filter(|&end| size > 0 && end <= HOST_RAM_SIZE)
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let base = cli.base as usize;
    let end = match gpio_window_end(base, cli.size) {
        Some(end) => end,
        None => bail!("GPIO window of {} bytes at 0x{:04X} does not fit in {} bytes of host RAM",
            cli.size, base, HOST_RAM_SIZE),
    };

    let mut ram = vec![0u8; HOST_RAM_SIZE];
    let config = InspectorConfig {
        size: cli.size,
        base_address: cli.base,
        ..InspectorConfig::default()
    };
    let mut insp = Inspector::attach(&mut ram[base..end], config)
        .context("attaching GPIO bank")?;
    let initial = insp.tick().cells;

    if let Some(ref path) = cli.frames {
        insp.load_frame_file(path);
    }

    if cli.headless {
        run_headless(&mut insp, initial, cli.dump)
    } else if cli.step {
        run_step_mode(&mut insp, cli.frames.as_ref());
        Ok(())
    } else {
        run_gui(&mut insp, cli.scale as usize, cli.frames.as_ref())
    }
}

// ─── GUI Mode ───────────────────────────────────────────────────────────────

/// Panel state that lives outside the core: selection and typed input.
struct Panel {
    selected: usize,
    bit_cursor: usize,
    /// Digits typed into the editor's value field
    value_buf: String,
    /// Digits typed for "Set Frame"
    seek_buf: String,
    quit: bool,
}

impl Panel {
    fn new() -> Self {
        Panel {
            selected: 0,
            bit_cursor: 0,
            value_buf: String::new(),
            seek_buf: String::new(),
            quit: false,
        }
    }
}

struct Layout {
    width: usize,
    height: usize,
    editor_top: usize,
    grid_top: usize,
}

impl Layout {
    fn new(size: usize, watch_rows: usize) -> Self {
        let rows = size.div_ceil(COLS);
        let editor_top = MARGIN + watch_rows * ROW_H;
        let grid_top = editor_top + ROW_H + MARGIN;
        Layout {
            width: MARGIN * 2 + COLS * PITCH,
            height: grid_top + rows * PITCH + MARGIN,
            editor_top,
            grid_top,
        }
    }

    fn cell_origin(&self, index: usize) -> (usize, usize) {
        (MARGIN + (index % COLS) * PITCH, self.grid_top + (index / COLS) * PITCH)
    }
}

fn run_gui<M: AsRef<[u8]> + AsMut<[u8]>>(
    insp: &mut Inspector<M>,
    scale: usize,
    frames_path: Option<&PathBuf>,
) -> Result<()> {
    let layout = Layout::new(insp.bank.size(), insp.config.watch.len());
    let scaled_w = layout.width * scale;
    let scaled_h = layout.height * scale;

    let mut window = Window::new(
        "PICO-8 GPIO Debug Panel", scaled_w, scaled_h,
        WindowOptions {
            scale: Scale::X1,
            scale_mode: ScaleMode::AspectRatioStretch,
            resize: true,
            ..Default::default()
        },
    ).map_err(|e| anyhow::anyhow!("Failed to create window: {}", e))?;
    window.set_target_fps(60);

    let mut panel = Panel::new();
    let mut buf = vec![COLOR_BG; layout.width * layout.height];
    let mut scaled_buf = vec![0u32; scaled_w * scaled_h];
    let mut last_title = String::new();

    while window.is_open() && !panel.quit {
        let shift = window.is_key_down(Key::LeftShift) || window.is_key_down(Key::RightShift);
        for key in window.get_keys_pressed(KeyRepeat::Yes) {
            if insp.editor.is_open() {
                editor_key(insp, &mut panel, key);
            } else {
                panel_key(insp, &mut panel, key, shift, frames_path);
            }
        }

        let refresh = insp.tick();
        draw(&mut buf, &layout, insp, &panel, &refresh.cells);

        for y in 0..layout.height {
            for x in 0..layout.width {
                let c = buf[y * layout.width + x];
                for sy in 0..scale {
                    let base = (y * scale + sy) * scaled_w + x * scale;
                    for sx in 0..scale {
                        scaled_buf[base + sx] = c;
                    }
                }
            }
        }
        window.update_with_buffer(&scaled_buf, scaled_w, scaled_h)
            .map_err(|e| anyhow::anyhow!("window update: {}", e))?;

        let title = window_title(insp, &panel);
        if title != last_title {
            window.set_title(&title);
            last_title = title;
        }
    }
    Ok(())
}

fn key_digit(key: Key) -> Option<u32> {
    match key {
        Key::Key0 | Key::NumPad0 => Some(0),
        Key::Key1 | Key::NumPad1 => Some(1),
        Key::Key2 | Key::NumPad2 => Some(2),
        Key::Key3 | Key::NumPad3 => Some(3),
        Key::Key4 | Key::NumPad4 => Some(4),
        Key::Key5 | Key::NumPad5 => Some(5),
        Key::Key6 | Key::NumPad6 => Some(6),
        Key::Key7 | Key::NumPad7 => Some(7),
        Key::Key8 | Key::NumPad8 => Some(8),
        Key::Key9 | Key::NumPad9 => Some(9),
        _ => None,
    }
}

/// Keys while no editor is open: selection, clears, frame navigation.
fn panel_key<M: AsRef<[u8]> + AsMut<[u8]>>(
    insp: &mut Inspector<M>,
    panel: &mut Panel,
    key: Key,
    shift: bool,
    frames_path: Option<&PathBuf>,
) {
    let size = insp.bank.size();
    if let Some(d) = key_digit(key) {
        if panel.seek_buf.len() < 6 {
            panel.seek_buf.push(char::from_digit(d, 10).unwrap_or('0'));
        }
        return;
    }
    match key {
        Key::Escape => {
            if panel.seek_buf.is_empty() { panel.quit = true; } else { panel.seek_buf.clear(); }
        }
        Key::Backspace => { panel.seek_buf.pop(); }
        Key::Left => panel.selected = panel.selected.saturating_sub(1),
        Key::Right => panel.selected = (panel.selected + 1).min(size - 1),
        Key::Up => panel.selected = panel.selected.saturating_sub(COLS),
        Key::Down => {
            if panel.selected + COLS < size { panel.selected += COLS; }
        }
        Key::Enter | Key::E => {
            insp.open_cell_editor(panel.selected);
            panel.bit_cursor = 0;
            panel.value_buf.clear();
        }
        Key::C => {
            if shift { insp.clear_all(); } else { insp.clear_preserve_first(); }
        }
        Key::N => { insp.next_frame(); }
        Key::P => { insp.prev_frame(); }
        Key::Home => { insp.seek_frame(1); }
        Key::End => {
            let count = insp.frame_status().count;
            insp.seek_frame(count);
        }
        Key::G => {
            // Set Frame: typed number, or re-apply the current frame
            let target = panel.seek_buf.parse().ok()
                .or(insp.frame_status().current);
            if let Some(n) = target {
                if !insp.seek_frame(n) { log::info!("No frame {}", n); }
            }
            panel.seek_buf.clear();
        }
        Key::L => match frames_path {
            Some(path) => { insp.load_frame_file(path); }
            None => log::info!("No frame document given (--frames FILE)"),
        },
        Key::D => {
            println!("--- {} ---\n{}{}", insp.frame_status(), insp.dump_watch(), insp.dump_bank());
        }
        _ => {}
    }
}

/// Keys while the editor is open: bits, value entry, commit/clear/discard.
fn editor_key<M: AsRef<[u8]> + AsMut<[u8]>>(insp: &mut Inspector<M>, panel: &mut Panel, key: Key) {
    let current = insp.editor.session().map(|s| s.value() as i64).unwrap_or(0);
    if let Some(d) = key_digit(key) {
        if panel.value_buf.len() < 3 {
            panel.value_buf.push(char::from_digit(d, 10).unwrap_or('0'));
        }
        insp.editor.set_value(panel.value_buf.parse().unwrap_or(0));
        return;
    }
    match key {
        Key::Backspace => {
            panel.value_buf.pop();
            insp.editor.set_value(panel.value_buf.parse().unwrap_or(0));
        }
        Key::Left => panel.bit_cursor = panel.bit_cursor.saturating_sub(1),
        Key::Right => panel.bit_cursor = (panel.bit_cursor + 1).min(bits::BITS - 1),
        Key::Space => {
            insp.editor.toggle_bit(panel.bit_cursor);
            panel.value_buf.clear();
        }
        Key::Up => { insp.editor.set_value(current + 1); panel.value_buf.clear(); }
        Key::Down => { insp.editor.set_value(current - 1); panel.value_buf.clear(); }
        Key::PageUp => { insp.editor.set_value(current + 16); panel.value_buf.clear(); }
        Key::PageDown => { insp.editor.set_value(current - 16); panel.value_buf.clear(); }
        Key::Enter => insp.commit_edit(),
        Key::Delete | Key::X => insp.clear_cell(),
        Key::Escape => insp.discard_edit(),
        _ => {}
    }
}

fn window_title<M: AsRef<[u8]> + AsMut<[u8]>>(insp: &Inspector<M>, panel: &Panel) -> String {
    let status = insp.frame_status();
    if let Some(s) = insp.editor.session() {
        return format!("{} | Edit Pin {} (0x{:04X}): {} (0x{:02x})",
            status, s.target.saturating_add(1), insp.address_of(s.target), s.value(), s.value());
    }
    if !panel.seek_buf.is_empty() {
        return format!("{} | Set Frame: {}_", status, panel.seek_buf);
    }
    // Tooltip lines without the bit glyphs, which the grid already shows
    let desc: Vec<String> = insp.describe_cell(panel.selected)
        .lines().take(2).map(str::to_owned).collect();
    format!("{} | {}", status, desc.join(" "))
}

fn fill_rect(buf: &mut [u32], stride: usize, x: usize, y: usize, w: usize, h: usize, c: u32) {
    for yy in y..y + h {
        let row = yy * stride;
        for xx in x..x + w {
            if let Some(p) = buf.get_mut(row + xx) { *p = c; }
        }
    }
}

fn outline_rect(buf: &mut [u32], stride: usize, x: usize, y: usize, w: usize, h: usize, c: u32) {
    fill_rect(buf, stride, x, y, w, 1, c);
    fill_rect(buf, stride, x, y + h - 1, w, 1, c);
    fill_rect(buf, stride, x, y, 1, h, c);
    fill_rect(buf, stride, x + w - 1, y, 1, h, c);
}

/// Shade a cell by value: dark when zero, brighter green as it grows.
fn cell_color(v: u8) -> u32 {
    if v == 0 { return COLOR_OFF; }
    let g = 0x40 + (v as u32 * 0xBF / 255);
    (0x20 << 16) | (g << 8) | 0x30
}

fn draw_bits(buf: &mut [u32], stride: usize, x: usize, y: usize, value: u8) {
    for (i, on) in bits::decode(value).iter().enumerate() {
        let c = if *on { COLOR_ON } else { COLOR_OFF };
        fill_rect(buf, stride, x + i * PITCH, y, SQUARE, SQUARE, c);
    }
}

fn draw<M: AsRef<[u8]> + AsMut<[u8]>>(
    buf: &mut [u32],
    layout: &Layout,
    insp: &Inspector<M>,
    panel: &Panel,
    cells: &[u8],
) {
    let stride = layout.width;
    buf.fill(COLOR_BG);

    // Watch rows
    for (row, w) in insp.config.watch.iter().enumerate() {
        let v = cells.get(w.index).copied().unwrap_or(0);
        draw_bits(buf, stride, MARGIN, MARGIN + row * ROW_H, v);
    }

    // Editor row: staged bits, cursor, and a swatch of the staged value
    if let Some(s) = insp.editor.session() {
        let y = layout.editor_top;
        draw_bits(buf, stride, MARGIN, y, s.value());
        outline_rect(buf, stride, MARGIN + panel.bit_cursor * PITCH - 1, y - 1, PITCH, PITCH, COLOR_EDIT);
        fill_rect(buf, stride, MARGIN + 9 * PITCH, y, SQUARE * 2, SQUARE, cell_color(s.value()));
    }

    // Grid
    for (i, &v) in cells.iter().enumerate() {
        let (x, y) = layout.cell_origin(i);
        fill_rect(buf, stride, x, y, SQUARE, SQUARE, cell_color(v));
    }
    let (x, y) = layout.cell_origin(panel.selected);
    let color = match insp.editor.session() {
        Some(s) => {
            let (ex, ey) = layout.cell_origin(s.target);
            outline_rect(buf, stride, ex - 1, ey - 1, PITCH, PITCH, COLOR_EDIT);
            if s.target == panel.selected { return; }
            COLOR_SELECT
        }
        None => COLOR_SELECT,
    };
    outline_rect(buf, stride, x - 1, y - 1, PITCH, PITCH, color);
}

// ─── Step Mode ──────────────────────────────────────────────────────────────

const STEP_HELP: &str = "\
Commands:
  d            dump bank          w          watch rows
  c            clear (keep pin 1) ca         clear all
  l [FILE]     load frames        n / p      next / prev frame
  s N          set frame N (1-based)
  e IDX        edit cell IDX (0-based)
  v N          stage value        t B        toggle bit B (0 = MSB)
  ok           commit edit        x          clear cell
  esc          discard edit       i IDX      describe cell
  h            help               q          quit";

fn run_step_mode<M: AsRef<[u8]> + AsMut<[u8]>>(insp: &mut Inspector<M>, frames_path: Option<&PathBuf>) {
    println!("{}", STEP_HELP);
    println!("{}", insp.frame_status());
    print!("{}", insp.dump_watch());

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("gpio> ");
        let _ = std::io::stdout().flush();
        let line = match lines.next() {
            Some(Ok(l)) => l,
            _ => break,
        };
        let mut parts = line.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let arg = parts.next();
        let num = arg.and_then(|a| a.parse::<i64>().ok());
        match (cmd, num) {
            ("", _) => continue,
            ("q" | "quit", _) => break,
            ("h" | "help", _) => { println!("{}", STEP_HELP); continue; }
            ("d" | "dump", _) => { print!("{}", insp.dump_bank()); continue; }
            ("w", _) => { print!("{}", insp.dump_watch()); continue; }
            ("i", Some(n)) if n >= 0 => { println!("{}", insp.describe_cell(n as usize)); continue; }
            ("c", _) => insp.clear_preserve_first(),
            ("ca", _) => insp.clear_all(),
            ("l", _) => {
                match arg.map(PathBuf::from).or_else(|| frames_path.cloned()) {
                    Some(path) => { insp.load_frame_file(&path); }
                    None => println!("No frame document given"),
                }
            }
            ("n", _) => { if !insp.next_frame() { println!("(last frame)"); } }
            ("p", _) => { if !insp.prev_frame() { println!("(first frame)"); } }
            ("s", Some(n)) => {
                if n < 1 || !insp.seek_frame(n as usize) { println!("No frame {}", n); }
            }
            ("e", Some(n)) if n >= 0 => insp.open_cell_editor(n as usize),
            ("v", Some(n)) => insp.editor.set_value(n),
            ("t", Some(n)) if n >= 0 => insp.editor.toggle_bit(n as usize),
            ("ok", _) => insp.commit_edit(),
            ("x", _) => insp.clear_cell(),
            ("esc", _) => insp.discard_edit(),
            _ => { println!("? (h for help)"); continue; }
        }
        print_state(insp);
    }
}

fn print_state<M: AsRef<[u8]> + AsMut<[u8]>>(insp: &mut Inspector<M>) {
    let refresh = insp.tick();
    println!("{}{}", insp.frame_status(), if refresh.changed { "  *" } else { "" });
    print!("{}", debugger::dump_watch(&refresh.cells, &insp.config.watch));
    if let Some(s) = insp.editor.session() {
        println!("  editing Pin {} (0x{:04X}): {:3} (0x{:02x})  {}",
            s.target.saturating_add(1), insp.address_of(s.target), s.value(), s.value(), bits::render(s.value()));
    }
}

// ─── Headless Mode ──────────────────────────────────────────────────────────

fn run_headless<M: AsRef<[u8]> + AsMut<[u8]>>(
    insp: &mut Inspector<M>,
    initial: Vec<u8>,
    dump: bool,
) -> Result<()> {
    if insp.frame_status().count == 0 {
        bail!("--headless needs a loadable frame document (--frames FILE)");
    }
    let base = insp.config.base_address;
    let mut prev = initial;
    loop {
        let refresh = insp.tick();
        println!("=== {} ===", insp.frame_status());
        print!("{}", debugger::dump_bank_diff(&prev, &refresh.cells, base));
        prev = refresh.cells;
        if !insp.next_frame() { break; }
    }
    println!();
    print!("{}", insp.dump_watch());
    if dump {
        println!();
        print!("{}", insp.dump_bank());
    }
    Ok(())
}
