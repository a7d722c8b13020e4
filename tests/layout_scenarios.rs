use std::f32::consts::{PI, TAU};

use eframe::egui::vec2;
use pag_explorer::layout::{
    ConnectivityMatrix, GlobalInput, Layout, LayoutConfig, LayoutRequest, NeighborSimilarity,
    RadialInput, UmapEmbedder, compute, compute_global_layout, compute_radial_layout,
};
use pag_explorer::palette::{PALETTE, cluster_color};
use pag_explorer::viewport::{MAX_SCALE, Viewport};

fn names(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

fn neighbor(id: &str, similarity: f64) -> NeighborSimilarity {
    NeighborSimilarity {
        id: id.to_string(),
        similarity,
    }
}

/// Four nodes in two tight pairs.
fn paired_matrix() -> ConnectivityMatrix {
    ConnectivityMatrix {
        rows: vec![
            vec![1.0, 0.9, 0.1, 0.0],
            vec![0.9, 1.0, 0.0, 0.1],
            vec![0.1, 0.0, 1.0, 0.8],
            vec![0.0, 0.1, 0.8, 1.0],
        ],
        sorted_nodes: names(&["A", "B", "C", "D"]),
    }
}

#[test]
fn two_node_matrix_yields_distinct_finite_positions() {
    let matrix = ConnectivityMatrix {
        rows: vec![vec![0.0, 1.0], vec![1.0, 0.0]],
        sorted_nodes: names(&["X", "Y"]),
    };

    let layout = compute_global_layout(
        &matrix,
        &[],
        vec2(800.0, 600.0),
        &UmapEmbedder,
        &LayoutConfig::default(),
    )
    .unwrap();

    assert_eq!(layout.nodes.len(), 2);
    let (x, y) = (&layout.nodes[0], &layout.nodes[1]);
    assert_eq!((x.id.as_str(), y.id.as_str()), ("X", "Y"));
    for node in &layout.nodes {
        assert!(node.position.x.is_finite() && node.position.y.is_finite());
    }
    assert_ne!(x.position, y.position);
}

#[test]
fn global_layout_is_deterministic() {
    let config = LayoutConfig::default();
    let first = compute_global_layout(
        &paired_matrix(),
        &[names(&["A", "B"]), names(&["C", "D"])],
        vec2(1024.0, 768.0),
        &UmapEmbedder,
        &config,
    )
    .unwrap();
    let second = compute_global_layout(
        &paired_matrix(),
        &[names(&["A", "B"]), names(&["C", "D"])],
        vec2(1024.0, 768.0),
        &UmapEmbedder,
        &config,
    )
    .unwrap();

    assert_eq!(first, second);
}

#[test]
fn global_positions_stay_inside_margin_box() {
    let layout = compute_global_layout(
        &paired_matrix(),
        &[],
        vec2(1024.0, 768.0),
        &UmapEmbedder,
        &LayoutConfig::default(),
    )
    .unwrap();

    for node in &layout.nodes {
        assert!(
            (99.9..=924.1).contains(&node.position.x),
            "{} x = {}",
            node.id,
            node.position.x
        );
        assert!(
            (99.9..=668.1).contains(&node.position.y),
            "{} y = {}",
            node.id,
            node.position.y
        );
    }
}

#[test]
fn two_neighbors_sit_on_opposite_rays() {
    let layout = compute_radial_layout(
        "N0",
        &[neighbor("N1", 1.0), neighbor("N2", 0.0)],
        vec2(800.0, 600.0),
        &LayoutConfig::default(),
    );

    let center = layout.focal.position;
    let (n1, n2) = (&layout.neighbors[0], &layout.neighbors[1]);
    assert_eq!(n1.radius, 100.0);
    assert_eq!(n2.radius, 425.0);
    assert_eq!(n1.angle, 0.0);
    assert!((n2.angle - PI).abs() < 1e-6);
    assert!((n1.position.distance(center) - 100.0).abs() < 1e-3);
    assert!((n2.position.distance(center) - 425.0).abs() < 1e-3);
}

#[test]
fn radial_rays_are_evenly_spaced_within_band() {
    let neighbors = (1..=7)
        .map(|index| neighbor(&format!("N{index}"), index as f64 / 8.0))
        .collect::<Vec<_>>();
    let layout = compute_radial_layout("N0", &neighbors, vec2(900.0, 900.0), &LayoutConfig::default());

    assert_eq!(layout.neighbors.len(), 7);
    assert_eq!(layout.edges.len(), 7);
    let step = TAU / 7.0;
    for (index, placed) in layout.neighbors.iter().enumerate() {
        let distance = placed.position.distance(layout.focal.position);
        assert!((100.0 - 1e-3..=425.0 + 1e-3).contains(&distance));
        assert!((placed.angle - step * index as f32).abs() < 1e-5);
    }
}

#[test]
fn dispatch_follows_request_variant() {
    let radial = compute(
        &LayoutRequest::Radial(RadialInput {
            focal: "N0".to_string(),
            neighbors: vec![neighbor("N1", 0.5)],
        }),
        vec2(800.0, 600.0),
        &UmapEmbedder,
        &LayoutConfig::default(),
    )
    .unwrap();
    assert!(matches!(radial, Layout::Radial(_)));

    let error = compute(
        &LayoutRequest::Global(GlobalInput {
            matrix: ConnectivityMatrix {
                rows: vec![vec![0.0, 1.0], vec![1.0]],
                sorted_nodes: names(&["X", "Y"]),
            },
            clusters: Vec::new(),
        }),
        vec2(800.0, 600.0),
        &UmapEmbedder,
        &LayoutConfig::default(),
    )
    .unwrap_err();
    assert_eq!(error.reason_code(), "not-square");
}

#[test]
fn toolbar_zoom_caps_at_five() {
    let container = vec2(800.0, 600.0);
    let mut viewport = Viewport::default();
    for _ in 0..20 {
        viewport.zoom_step(1.0, container);
        assert!(viewport.scale() <= MAX_SCALE);
    }
    assert_eq!(viewport.scale(), MAX_SCALE);
    assert!(!viewport.can_zoom_in());
}

#[test]
fn cluster_nine_wraps_to_second_color() {
    assert_eq!(cluster_color(Some(9)), PALETTE[1].color);
}
