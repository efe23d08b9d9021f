//! SVG rendering of a computed `DiagramLayout`.
use std::fmt::Write;

use crate::core::layout::{DiagramLayout, EdgePath, NodeBox, Point};
use crate::core::style::{
    BOX_CORNER_RADIUS, CONDITION_FONT_COLOR, CONDITION_FONT_SIZE, EDGE_COLOR, EDGE_WIDTH,
    FLOW_NAME_FONT_SIZE, FONT_FAMILY, FONT_SIZE, LINE_HEIGHT, Shape,
};

const ARROW_LENGTH: f32 = 9.0;
const ARROW_HALF_WIDTH: f32 = 4.0;
const DOUBLE_CIRCLE_INSET: f32 = 4.0;

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the layout as a standalone SVG document.
pub fn render_svg(layout: &DiagramLayout) -> String {
    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = write_document(&mut svg, layout);
    svg
}

fn write_document(svg: &mut String, layout: &DiagramLayout) -> std::fmt::Result {
    let (w, h) = (layout.width.ceil(), layout.height.ceil());
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    )?;
    writeln!(svg, r#"<rect x="0" y="0" width="{w}" height="{h}" fill="white"/>"#)?;

    for edge in &layout.edges {
        write_edge(svg, edge)?;
    }
    for node in &layout.nodes {
        write_node(svg, node)?;
    }
    for edge in &layout.edges {
        write_edge_label(svg, edge)?;
    }
    svg.push_str("</svg>\n");
    Ok(())
}

fn write_edge(svg: &mut String, edge: &EdgePath) -> std::fmt::Result {
    if edge.points.len() < 2 {
        return Ok(());
    }
    let n = edge.points.len();
    let tip = edge.points[n - 1];
    let before = edge.points[n - 2];
    let (dx, dy) = (tip.x - before.x, tip.y - before.y);
    let len = (dx * dx + dy * dy).sqrt();

    // stop the line at the arrow base so the tip stays sharp
    let mut points = edge.points.clone();
    let base = if len > ARROW_LENGTH {
        Point::new(tip.x - dx / len * ARROW_LENGTH, tip.y - dy / len * ARROW_LENGTH)
    } else {
        before
    };
    points[n - 1] = base;

    write!(svg, r#"<polyline fill="none" stroke="{EDGE_COLOR}" stroke-width="{EDGE_WIDTH}""#)?;
    if edge.back_edge {
        svg.push_str(r#" stroke-dasharray="5,3""#);
    }
    svg.push_str(r#" points=""#);
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            svg.push(' ');
        }
        write!(svg, "{:.1},{:.1}", p.x, p.y)?;
    }
    svg.push_str("\"/>\n");

    if len > 0.0 {
        let (ux, uy) = (dx / len, dy / len);
        let back = Point::new(tip.x - ux * ARROW_LENGTH, tip.y - uy * ARROW_LENGTH);
        let left = Point::new(back.x - uy * ARROW_HALF_WIDTH, back.y + ux * ARROW_HALF_WIDTH);
        let right = Point::new(back.x + uy * ARROW_HALF_WIDTH, back.y - ux * ARROW_HALF_WIDTH);
        writeln!(
            svg,
            r#"<polygon fill="{EDGE_COLOR}" points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}"/>"#,
            tip.x, tip.y, left.x, left.y, right.x, right.y
        )?;
    }
    Ok(())
}

fn write_edge_label(svg: &mut String, edge: &EdgePath) -> std::fmt::Result {
    let (Some(label), Some(at)) = (&edge.label, edge.label_at) else {
        return Ok(());
    };
    let (size, color) = if edge.conditional {
        (CONDITION_FONT_SIZE, CONDITION_FONT_COLOR)
    } else {
        (FLOW_NAME_FONT_SIZE, EDGE_COLOR)
    };
    writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" font-family="{FONT_FAMILY}" font-size="{size}" fill="{color}" text-anchor="middle" stroke="white" stroke-width="3" paint-order="stroke">{}</text>"#,
        at.x,
        at.y - 3.0,
        escape_xml(label)
    )
}

fn write_node(svg: &mut String, node: &NodeBox) -> std::fmt::Result {
    let c = node.center;
    let (hw, hh) = (node.width / 2.0, node.height / 2.0);
    let fill = node.style.fill;
    let stroke = node.style.stroke_width;
    let dashed = if node.style.shape == Shape::Ellipse {
        r#" stroke-dasharray="4,3""#
    } else {
        ""
    };

    match node.style.shape {
        Shape::Circle => writeln!(
            svg,
            r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{fill}" stroke="black" stroke-width="{stroke}"/>"#,
            c.x, c.y, hw
        )?,
        Shape::DoubleCircle => {
            writeln!(
                svg,
                r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{fill}" stroke="black" stroke-width="{stroke}"/>"#,
                c.x, c.y, hw
            )?;
            writeln!(
                svg,
                r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="none" stroke="black" stroke-width="{stroke}"/>"#,
                c.x,
                c.y,
                hw - DOUBLE_CIRCLE_INSET
            )?;
        }
        Shape::RoundedBox => writeln!(
            svg,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="{BOX_CORNER_RADIUS}" fill="{fill}" stroke="black" stroke-width="{stroke}"/>"#,
            c.x - hw,
            c.y - hh,
            node.width,
            node.height
        )?,
        Shape::Diamond => writeln!(
            svg,
            r#"<polygon points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}" fill="{fill}" stroke="black" stroke-width="{stroke}"/>"#,
            c.x,
            c.y - hh,
            c.x + hw,
            c.y,
            c.x,
            c.y + hh,
            c.x - hw,
            c.y
        )?,
        Shape::Ellipse => writeln!(
            svg,
            r#"<ellipse cx="{:.1}" cy="{:.1}" rx="{:.1}" ry="{:.1}" fill="{fill}" stroke="black" stroke-width="{stroke}"{dashed}/>"#,
            c.x, c.y, hw, hh
        )?,
    }

    let line_count = node.lines.len() as f32;
    let first_baseline = if node.label_inside {
        // vertically centered block; baseline sits ~0.35em below the line middle
        c.y - (line_count - 1.0) * LINE_HEIGHT / 2.0 + FONT_SIZE * 0.35
    } else {
        node.label_top() + FONT_SIZE
    };
    for (i, line) in node.lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-family="{FONT_FAMILY}" font-size="{FONT_SIZE}" text-anchor="middle">{}</text>"#,
            c.x,
            first_baseline + i as f32 * LINE_HEIGHT,
            escape_xml(line)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::{LayoutConfig, layout_document};
    use crate::io::bpmn::read_bpmn_str;

    const LOAN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL" id="d1">
  <process id="loan">
    <startEvent id="s"/>
    <exclusiveGateway id="gw" name="Amount &lt; 1000 &amp; ok?"/>
    <task id="auto" name="Auto approve"/>
    <endEvent id="e"/>
    <sequenceFlow id="f1" sourceRef="s" targetRef="gw"/>
    <sequenceFlow id="f2" sourceRef="gw" targetRef="auto">
      <conditionExpression>${amount &lt; 1000}</conditionExpression>
    </sequenceFlow>
    <sequenceFlow id="f3" sourceRef="auto" targetRef="e" name="done"/>
  </process>
</definitions>"#;

    fn loan_svg() -> String {
        let doc = read_bpmn_str(LOAN).unwrap();
        render_svg(&layout_document(&doc, &LayoutConfig::default()))
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_xml(r#"a<b & "c" 'd'>"#),
            "a&lt;b &amp; &quot;c&quot; &apos;d&apos;&gt;"
        );
    }

    #[test]
    fn draws_every_node_and_edge() {
        let svg = loan_svg();
        assert!(svg.starts_with("<svg "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 3);
        // end event is a double circle, start a single one
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(svg.contains(r#"fill="yellow""#));
        assert!(svg.contains("Amount &lt; 1000 &amp;"));
    }

    #[test]
    fn condition_labels_are_red_and_flow_names_plain() {
        let svg = loan_svg();
        assert!(svg.contains(r#"fill="red" text-anchor="middle""#));
        assert!(svg.contains(">[1]</text>"));
        assert!(svg.contains(">done</text>"));
    }

    #[test]
    fn output_is_deterministic() {
        assert_eq!(loan_svg(), loan_svg());
    }
}
