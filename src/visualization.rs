//! Visualization utilities for delivery paths.
//!
//! Generates SVG pictures of an instance with the chosen tasks highlighted
//! and the visiting order drawn as arrows.

use crate::error::Result;
use crate::instance::DeliveryInstance;
use crate::path::DeliveryPath;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// Radius of a selected task
    pub node_radius: f64,
    /// Print id, value and weight next to selected tasks
    pub show_labels: bool,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 6.0,
            show_labels: true,
        }
    }
}

/// Axis-aligned box around a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Bounds of every task in the instance; the unit square when empty.
    pub fn of(instance: &DeliveryInstance) -> Self {
        if instance.is_empty() {
            return Bounds {
                min_x: 0.0,
                max_x: 1.0,
                min_y: 0.0,
                max_y: 1.0,
            };
        }

        let mut bounds = Bounds {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for task in &instance.tasks {
            bounds.min_x = bounds.min_x.min(task.point.x);
            bounds.max_x = bounds.max_x.max(task.point.x);
            bounds.min_y = bounds.min_y.min(task.point.y);
            bounds.max_y = bounds.max_y.max(task.point.y);
        }
        bounds
    }

    fn span_x(&self) -> f64 {
        self.max_x - self.min_x
    }

    fn span_y(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canvas scale; a zero span constrains nothing, and all-zero gives 1.
    fn scale(&self, bounds: &Bounds) -> f64 {
        let fit = |inner: f64, span: f64| {
            if span > 0.0 {
                inner / span
            } else {
                f64::INFINITY
            }
        };
        let scale = fit(self.width - 2.0 * self.margin, bounds.span_x())
            .min(fit(self.height - 2.0 * self.margin, bounds.span_y()));
        if scale.is_finite() {
            scale
        } else {
            1.0
        }
    }

    /// Generate SVG visualization of a path on its instance
    pub fn generate_svg(&self, instance: &DeliveryInstance, path: &DeliveryPath<'_>) -> String {
        let mut svg = String::new();

        let bounds = Bounds::of(instance);
        let scale = self.scale(&bounds);
        let transform = |x: f64, y: f64| -> (f64, f64) {
            let tx = self.margin + (x - bounds.min_x) * scale;
            let ty = self.height - self.margin - (y - bounds.min_y) * scale;
            (tx, ty)
        };

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .task {{ fill: #bdc3c7; }}
    .selected {{ fill: #2ecc71; stroke: #27ae60; stroke-width: 2; }}
    .start {{ fill: #e74c3c; stroke: #c0392b; stroke-width: 2; }}
    .edge {{ stroke: #34495e; stroke-width: 1.5; fill: none; }}
    .label {{ font-family: Arial; font-size: 10px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<defs>
<marker id="arrow" markerWidth="10" markerHeight="10" refX="9" refY="3" orient="auto" markerUnits="strokeWidth">
<path d="M0,0 L0,6 L9,3 z" fill="#34495e"/>
</marker>
</defs>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">{} | {} of {} tasks | Profit: {:.2} | Weight: {:.1}/{}</text>
"##,
            self.margin,
            instance.name,
            path.len(),
            instance.len(),
            path.profit(),
            path.weight(),
            instance.capacity
        ));

        for task in &instance.tasks {
            let (x, y) = transform(task.point.x, task.point.y);
            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{:.1}" class="task"/>
"##,
                x,
                y,
                self.node_radius / 3.0
            ));
        }

        for pair in path.tasks().windows(2) {
            let (x1, y1) = transform(pair[0].point.x, pair[0].point.y);
            let (x2, y2) = transform(pair[1].point.x, pair[1].point.y);
            svg.push_str(&format!(
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="edge" marker-end="url(#arrow)"/>
"#,
                x1, y1, x2, y2
            ));
        }

        for (i, task) in path.tasks().iter().enumerate() {
            let (x, y) = transform(task.point.x, task.point.y);
            let class = if i == 0 { "start" } else { "selected" };
            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
"##,
                x, y, self.node_radius, class
            ));

            if self.show_labels {
                svg.push_str(&format!(
                    r##"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{} ({}/{})</text>
"##,
                    x,
                    y - self.node_radius - 3.0,
                    task.id,
                    task.value(),
                    task.weight()
                ));
            }
        }

        svg.push_str("</svg>");

        svg
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::instance::Task;

    fn create_test_instance() -> DeliveryInstance {
        let tasks = vec![
            Task::new(0, 100.0, 10.0, Point::new(0.0, 0.0)).unwrap(),
            Task::new(1, 100.0, 10.0, Point::new(1.0, 0.0)).unwrap(),
            Task::new(2, 100.0, 10.0, Point::new(0.0, 1.0)).unwrap(),
        ];
        DeliveryInstance::new("test", tasks, 25.0).unwrap()
    }

    #[test]
    fn test_visualizer() {
        let instance = create_test_instance();
        let path = DeliveryPath::new(&instance.distances, instance.tasks[..2].to_vec());

        let svg = Visualizer::new().generate_svg(&instance, &path);

        assert!(svg.starts_with("<?xml"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("test"));
        assert_eq!(svg.matches("class=\"task\"").count(), 3);
        assert_eq!(svg.matches("class=\"start\"").count(), 1);
        assert_eq!(svg.matches("class=\"selected\"").count(), 1);
        assert_eq!(svg.matches("class=\"edge\"").count(), 1);
    }

    #[test]
    fn test_empty_path_and_instance() {
        let instance = DeliveryInstance::new("empty", Vec::new(), 10.0).unwrap();
        let path = DeliveryPath::empty(&instance.distances);
        let svg = Visualizer::new().generate_svg(&instance, &path);
        assert!(!svg.contains("class=\"edge\""));
        assert_eq!(Bounds::of(&instance).max_x, 1.0);
    }

    #[test]
    fn test_points_stay_on_canvas() {
        let instance = create_test_instance();
        let viz = Visualizer::new();
        let bounds = Bounds::of(&instance);
        let scale = viz.scale(&bounds);
        assert!((scale - 700.0).abs() < 1e-9);
    }
}
