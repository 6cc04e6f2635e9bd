//! Text and JSON rendering of decoded modules

use nether_itfile::{Block, ItFile, ItNote, PackedPattern};
use serde::Serialize;

/// Serializable overview of a decoded file
#[derive(Debug, Serialize)]
pub struct Summary {
    pub name: String,
    pub created_with: String,
    pub compatible_with: String,
    pub channels: u8,
    pub orders: usize,
    pub playable_orders: usize,
    pub instrument_slots: usize,
    pub instruments: Vec<String>,
    pub sample_slots: usize,
    pub samples: Vec<SampleSummary>,
    pub patterns: usize,
    pub boundary: usize,
    pub message: Option<String>,
    pub blocks: Vec<BlockSummary>,
    pub edit_history: Vec<HistorySummary>,
}

#[derive(Debug, Serialize)]
pub struct SampleSummary {
    pub name: String,
    pub bytes: usize,
    pub sixteen_bit: bool,
    pub stereo: bool,
    pub compressed: bool,
}

#[derive(Debug, Serialize)]
pub struct BlockSummary {
    pub tag: String,
    pub length: usize,
}

#[derive(Debug, Serialize)]
pub struct HistorySummary {
    pub date: Option<String>,
    pub time: Option<String>,
    pub runtime_secs: f64,
}

/// Tracker versions are stored as BCD-like `0xMmm`
fn version_string(version: u16) -> String {
    format!("{:x}.{:02x}", version >> 8, version & 0xFF)
}

impl Summary {
    pub fn from_file(file: &ItFile) -> Self {
        let header = &file.header;
        Self {
            name: header.name.clone(),
            created_with: version_string(header.created_with),
            compatible_with: version_string(header.compatible_with),
            channels: header.active_channels(),
            orders: file.orders.len(),
            playable_orders: file.total_orders(),
            instrument_slots: file.instruments.len(),
            instruments: file
                .instruments
                .iter()
                .flatten()
                .map(|inst| inst.name().to_string())
                .collect(),
            sample_slots: file.samples.len(),
            samples: file
                .samples
                .iter()
                .flatten()
                .map(|smp| SampleSummary {
                    name: smp.header.name.clone(),
                    bytes: smp.data.len(),
                    sixteen_bit: smp.header.is_16bit(),
                    stereo: smp.header.is_stereo(),
                    compressed: smp.header.is_compressed(),
                })
                .collect(),
            patterns: file.patterns.len(),
            boundary: file.boundary,
            message: file.message.clone(),
            blocks: file.blocks.iter().map(block_summary).collect(),
            edit_history: file
                .edit_history
                .iter()
                .map(|entry| HistorySummary {
                    date: entry.date.to_naive_date().map(|d| d.to_string()),
                    time: entry.time.to_naive_time().map(|t| t.to_string()),
                    runtime_secs: entry.runtime.duration().as_secs_f64(),
                })
                .collect(),
        }
    }

    /// Human-readable multi-line rendering
    pub fn to_text(&self) -> String {
        let mut out = Vec::new();
        out.push(format!("Name:        {}", self.name));
        out.push(format!(
            "Tracker:     {} (compatible {})",
            self.created_with, self.compatible_with
        ));
        out.push(format!("Channels:    {}", self.channels));
        out.push(format!(
            "Orders:      {} ({} playable)",
            self.orders, self.playable_orders
        ));
        out.push(format!(
            "Instruments: {} of {} slots",
            self.instruments.len(),
            self.instrument_slots
        ));
        out.push(format!(
            "Samples:     {} of {} slots",
            self.samples.len(),
            self.sample_slots
        ));
        out.push(format!("Patterns:    {}", self.patterns));
        out.push(format!("Boundary:    0x{:08X}", self.boundary));

        for block in &self.blocks {
            out.push(format!("Block:       {} ({} bytes)", block.tag, block.length));
        }
        for entry in &self.edit_history {
            out.push(format!(
                "Edited:      {} {} for {:.1}s",
                entry.date.as_deref().unwrap_or("????-??-??"),
                entry.time.as_deref().unwrap_or("??:??:??"),
                entry.runtime_secs
            ));
        }
        for (i, name) in self.instruments.iter().enumerate() {
            out.push(format!("  I{:02} {}", i + 1, name));
        }
        for (i, smp) in self.samples.iter().enumerate() {
            out.push(format!(
                "  S{:02} {} ({} bytes{}{}{})",
                i + 1,
                smp.name,
                smp.bytes,
                if smp.sixteen_bit { ", 16-bit" } else { "" },
                if smp.stereo { ", stereo" } else { "" },
                if smp.compressed { ", compressed" } else { "" },
            ));
        }
        if let Some(message) = &self.message {
            out.push(String::new());
            out.push(message.clone());
        }
        out.join("\n")
    }
}

fn block_summary(block: &Block) -> BlockSummary {
    BlockSummary {
        tag: block.tag_str(),
        length: block.length(),
    }
}

fn render_cell(cell: &ItNote) -> String {
    let note = cell.note.map_or_else(|| "...".to_string(), |n| n.to_string());
    let instrument = match cell.instrument {
        0 => "..".to_string(),
        i => format!("{i:02X}"),
    };
    let volume = cell
        .volume
        .map_or_else(|| "..".to_string(), |v| format!("{v:02X}"));
    let effect = match cell.effect {
        1..=26 => format!("{}{:02X}", (b'A' + cell.effect - 1) as char, cell.effect_param),
        _ => "...".to_string(),
    };
    format!("{note} {instrument} {volume} {effect}")
}

/// Unpack a pattern into one text line per row
pub fn render_pattern(pattern: &PackedPattern, channels: u8) -> Vec<String> {
    pattern
        .unpack(channels)
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            let cells: Vec<String> = cells.iter().map(render_cell).collect();
            format!("{row:03} | {}", cells.join(" | "))
        })
        .collect()
}
