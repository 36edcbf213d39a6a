pub mod canvas;
pub mod charting;
pub mod screen;

use fittr::{
    config::Config,
    fit::{index_of_difficulty, FittsModel},
    measurement::Columns,
    surface::{bounds, SurfaceMesh, DISTANCE_STEPS, WIDTH_STEPS},
    util::{linspace, mean, std_dev},
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Points},
        Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget,
    },
};

use crate::{ui::canvas::CanvasMapping, App, ChartAxis};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const FITTED_LINE_POINTS: usize = 50;

/// Header, bordered canvas and legend rows of the test screen
pub fn test_layout(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

fn canvas_block(config: &Config) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {}x{} ", config.canvas_width, config.canvas_height))
}

/// Cell to canvas mapping for a terminal of size `area`
pub fn canvas_mapping(area: Rect, config: &Config) -> CanvasMapping {
    let (_, canvas_area, _) = test_layout(area);
    let inner = canvas_block(config).inner(canvas_area);
    CanvasMapping::new(inner, config.canvas_width, config.canvas_height)
}

pub fn render_test(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let (header, canvas_area, legend) = test_layout(area);

    Paragraph::new(Line::from(vec![
        Span::styled("Please click the shapes as fast as you can.", bold_style),
        Span::raw("   "),
        Span::styled(format!("{} hits", app.session.log().len()), dim_bold_style),
    ]))
    .render(header, buf);

    let mapping = canvas_mapping(area, &app.config);
    // braille packs 2x4 dots per cell; fill the disc one dot apart
    let step = (mapping.pixels_per_column() / 2.0)
        .min(mapping.pixels_per_row() / 4.0)
        .max(1.0);
    let target = app.session.target().copied();

    Canvas::default()
        .block(canvas_block(&app.config))
        .marker(Marker::Braille)
        .x_bounds([0.0, f64::from(app.config.canvas_width)])
        .y_bounds([0.0, f64::from(app.config.canvas_height)])
        .paint(move |ctx| {
            if let Some(t) = target {
                let y = mapping.draw_y(t.y);
                let mut radius = t.r;
                while radius > 0.0 {
                    ctx.draw(&Circle {
                        x: t.x,
                        y,
                        radius,
                        color: Color::Gray,
                    });
                    radius -= step;
                }
                ctx.draw(&Points {
                    coords: &[(t.x, y)],
                    color: Color::Gray,
                });
            }
        })
        .render(canvas_area, buf);

    let legend_line = match &app.last_error {
        Some(err) => Span::styled(err.clone(), Style::default().fg(Color::Red)),
        None => Span::styled("(f)inish / (esc)ape", italic_style),
    };
    Paragraph::new(legend_line).render(legend, buf);
}

/// Prediction curve (difficulty axis) or projected mesh (distance, width)
pub fn fitted_points(axis: ChartAxis, model: &FittsModel, columns: &Columns) -> Vec<(f64, f64)> {
    match axis {
        ChartAxis::Difficulty => {
            let ids: Vec<f64> = columns
                .distance
                .iter()
                .zip(columns.width.iter())
                .map(|(&d, &w)| index_of_difficulty(d, w))
                .collect();
            match bounds(&ids) {
                Some((lo, hi)) => linspace(lo, hi, FITTED_LINE_POINTS)
                    .into_iter()
                    .map(|id| (id, model.predict_id(id)))
                    .collect(),
                None => vec![],
            }
        }
        ChartAxis::Distance | ChartAxis::Width => {
            SurfaceMesh::evaluate(model, columns, DISTANCE_STEPS, WIDTH_STEPS)
                .map(|mesh| {
                    mesh.points()
                        .map(|(d, w, e)| match axis {
                            ChartAxis::Distance => (d, e),
                            _ => (w, e),
                        })
                        .collect()
                })
                .unwrap_or_default()
        }
    }
}

pub fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(finished) = &app.finished else {
        return;
    };

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // model
            Constraint::Length(1), // timing
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let axis = app.axis;
    let columns = finished.columns();
    let trials: Vec<(f64, f64)> = finished
        .trials()
        .iter()
        .map(|m| (axis.value(m), m.elapsed))
        .collect();
    let fitted = finished
        .report()
        .map(|report| fitted_points(axis, &report.model, &columns))
        .unwrap_or_default();

    let all: Vec<(f64, f64)> = trials.iter().chain(fitted.iter()).copied().collect();
    let (x_bounds, y_bounds) = charting::compute_chart_bounds(&all);

    let mut datasets = vec![Dataset::default()
        .name("trials")
        .marker(Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(Color::Cyan))
        .data(&trials)];
    if !fitted.is_empty() {
        datasets.push(
            Dataset::default()
                .name("model")
                .marker(Marker::Braille)
                .graph_type(match axis {
                    ChartAxis::Difficulty => GraphType::Line,
                    _ => GraphType::Scatter,
                })
                .style(Style::default().fg(Color::Green).add_modifier(Modifier::DIM))
                .data(&fitted),
        );
    }

    let labels = |b: [f64; 2]| {
        vec![
            Span::styled(charting::format_label(b[0]), bold_style),
            Span::styled(charting::format_label(b[1]), bold_style),
        ]
    };

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(axis.title())
                .bounds(x_bounds)
                .labels(labels(x_bounds)),
        )
        .y_axis(
            Axis::default()
                .title("seconds")
                .bounds(y_bounds)
                .labels(labels(y_bounds)),
        )
        .render(chunks[0], buf);

    let model_line = match &finished.fit {
        Ok(report) => Span::styled(
            format!(
                "a = {:.3} s   b = {:.3} s/bit   {} bits/s   R² {}   {} trials",
                report.model.a,
                report.model.b,
                report
                    .model
                    .throughput()
                    .map_or_else(|| "-".to_string(), |tp| format!("{tp:.2}")),
                report
                    .r_squared
                    .map_or_else(|| "-".to_string(), |r| format!("{r:.3}")),
                trials.len()
            ),
            bold_style,
        ),
        Err(err) => Span::styled(
            format!("no model: {err}"),
            Style::default().patch(bold_style).fg(Color::Red),
        ),
    };
    Paragraph::new(model_line)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    if let (Some(m), Some(sd)) = (mean(&columns.elapsed), std_dev(&columns.elapsed)) {
        Paragraph::new(Span::styled(
            format!("mean {m:.3} s   sd {sd:.3} s"),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }

    Paragraph::new(Span::styled(
        format!("(n)ew / (v)iew: {axis} / (esc)ape"),
        italic_style,
    ))
    .render(chunks[4], buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Columns {
        Columns {
            elapsed: vec![0.5, 0.9, 0.7],
            distance: vec![120.0, 600.0, 300.0],
            width: vec![40.0, 8.0, 20.0],
        }
    }

    #[test]
    fn test_fitted_line_spans_observed_difficulty() {
        let model = FittsModel::new(0.2, 0.1);
        let points = fitted_points(ChartAxis::Difficulty, &model, &columns());
        assert_eq!(points.len(), FITTED_LINE_POINTS);
        assert_eq!(points[0].0, index_of_difficulty(120.0, 40.0));
        assert_eq!(points[FITTED_LINE_POINTS - 1].0, index_of_difficulty(600.0, 8.0));
        assert!(points.iter().all(|&(id, e)| (e - model.predict_id(id)).abs() < 1e-12));
    }

    #[test]
    fn test_fitted_mesh_projects_onto_axis() {
        let model = FittsModel::new(0.2, 0.1);
        let by_width = fitted_points(ChartAxis::Width, &model, &columns());
        assert_eq!(by_width.len(), DISTANCE_STEPS * WIDTH_STEPS);
        assert!(by_width.iter().all(|&(w, _)| (8.0..=40.0).contains(&w)));

        let by_distance = fitted_points(ChartAxis::Distance, &model, &columns());
        assert!(by_distance.iter().all(|&(d, _)| (120.0..=600.0).contains(&d)));
    }

    #[test]
    fn test_canvas_mapping_uses_bordered_canvas() {
        let config = Config::default();
        let mapping = canvas_mapping(Rect::new(0, 0, 102, 45), &config);
        // one column margin plus border on the left, header row plus border on top
        assert_eq!(mapping.cell_bounds(1, 1), None);
        let (lo, _) = mapping.cell_bounds(2, 2).unwrap();
        assert_eq!((lo.x, lo.y), (0.0, 0.0));
    }
}
