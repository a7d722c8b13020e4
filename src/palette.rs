use eframe::egui::Color32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NamedColor {
    pub name: &'static str,
    pub color: Color32,
}

pub const PALETTE: [NamedColor; 8] = [
    NamedColor {
        name: "red",
        color: Color32::from_rgb(255, 0, 0),
    },
    NamedColor {
        name: "green",
        color: Color32::from_rgb(0, 128, 0),
    },
    NamedColor {
        name: "blue",
        color: Color32::from_rgb(0, 0, 255),
    },
    NamedColor {
        name: "orange",
        color: Color32::from_rgb(255, 165, 0),
    },
    NamedColor {
        name: "purple",
        color: Color32::from_rgb(128, 0, 128),
    },
    NamedColor {
        name: "cyan",
        color: Color32::from_rgb(0, 255, 255),
    },
    NamedColor {
        name: "magenta",
        color: Color32::from_rgb(255, 0, 255),
    },
    NamedColor {
        name: "yellow",
        color: Color32::from_rgb(255, 255, 0),
    },
];

pub const UNCLUSTERED: NamedColor = PALETTE[0];

pub fn cluster_entry(cluster: Option<usize>) -> NamedColor {
    match cluster {
        Some(index) => PALETTE[index % PALETTE.len()],
        None => UNCLUSTERED,
    }
}

pub fn cluster_color(cluster: Option<usize>) -> Color32 {
    cluster_entry(cluster).color
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color32,
}

pub fn legend(cluster_count: usize) -> Vec<LegendEntry> {
    (0..cluster_count)
        .map(|index| LegendEntry {
            label: format!("Cluster {}", index + 1),
            color: cluster_color(Some(index)),
        })
        .collect()
}

/// Red for 0 through green for 1, as `hsl(sim * 120, 100%, 50%)`.
pub fn similarity_color(similarity: f64) -> Color32 {
    let hue = similarity.clamp(0.0, 1.0) as f32 * 120.0;
    hsl_to_rgb(hue, 1.0, 0.5)
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let channel = |value: f32| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;

    Color32::from_rgb(channel(r), channel(g), channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_index_wraps_around_palette() {
        assert_eq!(cluster_entry(Some(9)).name, "green");
        assert_eq!(cluster_color(Some(9)), PALETTE[1].color);
        assert_eq!(cluster_color(Some(8)), PALETTE[0].color);
    }

    #[test]
    fn unclustered_uses_fallback() {
        assert_eq!(cluster_entry(None), UNCLUSTERED);
    }

    #[test]
    fn legend_labels_are_one_based() {
        let entries = legend(3);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].label, "Cluster 1");
        assert_eq!(entries[2].color, PALETTE[2].color);
    }

    #[test]
    fn similarity_color_spans_red_to_green() {
        assert_eq!(similarity_color(0.0), Color32::from_rgb(255, 0, 0));
        assert_eq!(similarity_color(1.0), Color32::from_rgb(0, 255, 0));
        assert_eq!(similarity_color(0.5), Color32::from_rgb(255, 255, 0));
        assert_eq!(similarity_color(7.0), similarity_color(1.0));
    }
}
