use std::f32::consts::{PI, TAU};

use taskdeck_shared::{CategorySlice, DailyActivity};
use yew::{function_component, html, Html, Properties};

pub const CHART_WIDTH: f32 = 360.0;
pub const CHART_HEIGHT: f32 = 160.0;
const CHART_PAD: f32 = 14.0;

const DOUGHNUT_SIZE: f32 = 180.0;
const DOUGHNUT_OUTER: f32 = 80.0;
// 60% cutout.
const DOUGHNUT_INNER: f32 = 48.0;
const UNCATEGORIZED_COLOR: &str = "#6b7280";

/// Evenly spread the series across the drawable width and scale values
/// against `max`, y growing downward. A single point lands centered.
pub fn scale_points(values: &[u32], max: u32, width: f32, height: f32) -> Vec<(f32, f32)> {
    let max = max.max(1) as f32;
    let inner_w = width - 2.0 * CHART_PAD;
    let inner_h = height - 2.0 * CHART_PAD;
    let step = if values.len() > 1 {
        inner_w / (values.len() - 1) as f32
    } else {
        0.0
    };

    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let x = if values.len() > 1 {
                CHART_PAD + step * index as f32
            } else {
                width / 2.0
            };
            let y = CHART_PAD + (1.0 - *value as f32 / max) * inner_h;
            (x, y)
        })
        .collect()
}

pub fn polyline(points: &[(f32, f32)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoughnutSegment {
    pub label: String,
    pub color: String,
    pub value: u32,
    pub start: f32,
    pub end: f32,
}

/// Angular layout of the per-category counts, starting at twelve o'clock.
/// Zero-count slices are dropped; a zero total yields no segments.
pub fn doughnut_segments(slices: &[CategorySlice]) -> Vec<DoughnutSegment> {
    let total: u32 = slices.iter().map(|slice| slice.total).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut angle = -PI / 2.0;
    for slice in slices.iter().filter(|slice| slice.total > 0) {
        let sweep = slice.total as f32 / total as f32 * TAU;
        segments.push(DoughnutSegment {
            label: slice
                .name
                .clone()
                .unwrap_or_else(|| "Uncategorized".to_string()),
            color: slice
                .color
                .clone()
                .unwrap_or_else(|| UNCATEGORIZED_COLOR.to_string()),
            value: slice.total,
            start: angle,
            end: angle + sweep,
        });
        angle += sweep;
    }
    segments
}

/// SVG path for one annular sector. A full-circle segment is pulled in a
/// hair so the arc endpoints stay distinct.
pub fn annular_sector_path(cx: f32, cy: f32, outer: f32, inner: f32, start: f32, end: f32) -> String {
    let end = if end - start >= TAU { start + TAU - 0.001 } else { end };
    let large_arc = u8::from(end - start > PI);

    let (sin_s, cos_s) = start.sin_cos();
    let (sin_e, cos_e) = end.sin_cos();
    let ox1 = cx + outer * cos_s;
    let oy1 = cy + outer * sin_s;
    let ox2 = cx + outer * cos_e;
    let oy2 = cy + outer * sin_e;
    let ix1 = cx + inner * cos_e;
    let iy1 = cy + inner * sin_e;
    let ix2 = cx + inner * cos_s;
    let iy2 = cy + inner * sin_s;

    format!(
        "M {ox1:.2} {oy1:.2} \
         A {outer:.2} {outer:.2} 0 {large_arc} 1 {ox2:.2} {oy2:.2} \
         L {ix1:.2} {iy1:.2} \
         A {inner:.2} {inner:.2} 0 {large_arc} 0 {ix2:.2} {iy2:.2} Z"
    )
}

#[derive(Properties, PartialEq)]
pub struct ProductivityChartProps {
    pub daily: Vec<DailyActivity>,
}

/// Tasks created vs completed per day. Colors ride on CSS classes, so a
/// theme change restyles the chart without rebuilding it.
#[function_component(ProductivityChart)]
pub fn productivity_chart(props: &ProductivityChartProps) -> Html {
    if props.daily.is_empty() {
        return html! { <p class="text-muted">{ "No activity yet" }</p> };
    }

    let created: Vec<u32> = props.daily.iter().map(|day| day.created).collect();
    let completed: Vec<u32> = props.daily.iter().map(|day| day.completed).collect();
    let max = created
        .iter()
        .chain(completed.iter())
        .copied()
        .max()
        .unwrap_or(1);

    let created_points = polyline(&scale_points(&created, max, CHART_WIDTH, CHART_HEIGHT));
    let completed_points = polyline(&scale_points(&completed, max, CHART_WIDTH, CHART_HEIGHT));

    html! {
        <figure class="chart productivity-chart">
            <svg viewBox={format!("0 0 {CHART_WIDTH} {CHART_HEIGHT}")} role="img">
                <polyline class="chart-line created" points={created_points} fill="none" />
                <polyline class="chart-line completed" points={completed_points} fill="none" />
            </svg>
            <figcaption class="chart-legend">
                <span class="legend-swatch created"></span>{ "Created" }
                <span class="legend-swatch completed"></span>{ "Completed" }
            </figcaption>
            <div class="chart-axis">
                {
                    for props.daily.iter().map(|day| html! {
                        <span class="axis-label">{ &day.day }</span>
                    })
                }
            </div>
        </figure>
    }
}

#[derive(Properties, PartialEq)]
pub struct CategoryChartProps {
    pub slices: Vec<CategorySlice>,
}

#[function_component(CategoryChart)]
pub fn category_chart(props: &CategoryChartProps) -> Html {
    let segments = doughnut_segments(&props.slices);
    if segments.is_empty() {
        return html! { <p class="text-muted">{ "No categorized tasks yet" }</p> };
    }

    let center = DOUGHNUT_SIZE / 2.0;

    html! {
        <figure class="chart category-chart">
            <svg viewBox={format!("0 0 {DOUGHNUT_SIZE} {DOUGHNUT_SIZE}")} role="img">
                {
                    for segments.iter().map(|segment| {
                        let d = annular_sector_path(
                            center,
                            center,
                            DOUGHNUT_OUTER,
                            DOUGHNUT_INNER,
                            segment.start,
                            segment.end,
                        );
                        html! { <path {d} fill={segment.color.clone()} /> }
                    })
                }
            </svg>
            <figcaption class="chart-legend vertical">
                {
                    for segments.iter().map(|segment| html! {
                        <span class="legend-entry">
                            <span
                                class="legend-swatch"
                                style={format!("background:{}", segment.color)}
                            ></span>
                            { format!("{} ({})", segment.label, segment.value) }
                        </span>
                    })
                }
            </figcaption>
        </figure>
    }
}

#[cfg(test)]
mod chart_tests {
    use super::*;

    #[test]
    fn scaled_points_stay_inside_the_padded_box() {
        let points = scale_points(&[0, 3, 7, 2], 7, CHART_WIDTH, CHART_HEIGHT);
        assert_eq!(points.len(), 4);
        for (x, y) in &points {
            assert!(*x >= CHART_PAD && *x <= CHART_WIDTH - CHART_PAD);
            assert!(*y >= CHART_PAD - 0.01 && *y <= CHART_HEIGHT - CHART_PAD + 0.01);
        }
        // The max value touches the top, a zero touches the bottom.
        assert!((points[2].1 - CHART_PAD).abs() < 0.01);
        assert!((points[0].1 - (CHART_HEIGHT - CHART_PAD)).abs() < 0.01);
    }

    #[test]
    fn an_all_zero_series_does_not_divide_by_zero() {
        let points = scale_points(&[0, 0, 0], 0, CHART_WIDTH, CHART_HEIGHT);
        assert!(points.iter().all(|(_, y)| y.is_finite()));
    }

    #[test]
    fn a_single_point_is_centered() {
        let points = scale_points(&[5], 5, CHART_WIDTH, CHART_HEIGHT);
        assert_eq!(points.len(), 1);
        assert!((points[0].0 - CHART_WIDTH / 2.0).abs() < 0.01);
    }

    fn slice(name: &str, total: u32) -> CategorySlice {
        CategorySlice {
            name: Some(name.to_string()),
            color: Some("#6366f1".to_string()),
            total,
        }
    }

    #[test]
    fn segments_cover_the_full_circle() {
        let segments = doughnut_segments(&[slice("a", 1), slice("b", 2), slice("c", 1)]);
        assert_eq!(segments.len(), 3);

        let sweep: f32 = segments.iter().map(|s| s.end - s.start).sum();
        assert!((sweep - TAU).abs() < 0.001);

        // Adjacent segments share a boundary.
        assert!((segments[0].end - segments[1].start).abs() < 0.001);
        assert!((segments[1].end - segments[2].start).abs() < 0.001);
    }

    #[test]
    fn zero_counts_are_dropped_and_zero_totals_yield_nothing() {
        assert!(doughnut_segments(&[]).is_empty());
        assert!(doughnut_segments(&[slice("a", 0)]).is_empty());

        let segments = doughnut_segments(&[slice("a", 0), slice("b", 3)]);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].label, "b");
    }

    #[test]
    fn unnamed_slices_fall_back_to_uncategorized() {
        let anonymous = CategorySlice {
            name: None,
            color: None,
            total: 2,
        };
        let segments = doughnut_segments(&[anonymous]);
        assert_eq!(segments[0].label, "Uncategorized");
        assert_eq!(segments[0].color, UNCATEGORIZED_COLOR);
    }

    #[test]
    fn sector_paths_use_the_large_arc_flag_past_half() {
        let small = annular_sector_path(90.0, 90.0, 80.0, 48.0, 0.0, PI / 2.0);
        assert!(small.contains(" 0 0 1 "));

        let large = annular_sector_path(90.0, 90.0, 80.0, 48.0, 0.0, 1.5 * PI);
        assert!(large.contains(" 0 1 1 "));
    }

    #[test]
    fn a_full_circle_still_produces_distinct_arc_endpoints() {
        let path = annular_sector_path(90.0, 90.0, 80.0, 48.0, -PI / 2.0, -PI / 2.0 + TAU);
        let mut numbers = path
            .split_whitespace()
            .filter_map(|token| token.parse::<f32>().ok());
        let move_x = numbers.next().expect("move x");
        // The closing arc endpoint must not coincide with the start.
        assert!(path.matches('A').count() == 2);
        assert!(move_x.is_finite());
    }
}
