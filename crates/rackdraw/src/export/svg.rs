//! Whole-scene SVG document

use std::fmt::Write as _;

use crate::core::svg::{escape_xml, fmt_num, open_document, write_primitives};
use crate::core::Rect;
use crate::scene::Scene;

/// Document area: the view, grown to cover every object
///
/// Objects left of or above the origin move the document origin with them.
pub(crate) fn document_bounds(scene: &Scene) -> Rect {
    let view = Rect::new(0.0, 0.0, scene.view.width, scene.view.height);
    let covered = scene.bounds().map_or(view, |bounds| view.union(&bounds));
    Rect::new(
        covered.x,
        covered.y,
        covered.width.max(1.0),
        covered.height.max(1.0),
    )
}

/// Render the scene as one SVG document
///
/// Each object becomes a group translated to its position and scaled
/// uniformly, carrying its catalog tags as `data-` attributes.
pub fn export_svg(scene: &Scene) -> String {
    let document = document_bounds(scene);
    let mut out = String::new();
    open_document(&mut out, document);
    let _ = writeln!(
        out,
        "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#ffffff\"/>",
        fmt_num(document.x),
        fmt_num(document.y),
        fmt_num(document.width),
        fmt_num(document.height)
    );

    for object in scene.iter() {
        let _ = write!(
            out,
            "  <g id=\"object-{}\" transform=\"translate({} {}) scale({})\" data-category=\"{}\" data-key=\"{}\" data-name=\"{}\" data-rack-units=\"{}\"",
            object.id,
            fmt_num(object.x),
            fmt_num(object.y),
            fmt_num(object.scale),
            escape_xml(&object.category),
            escape_xml(&object.key),
            escape_xml(&object.equipment_name),
            object.rack_units
        );
        if let Some(position) = object.rack_position {
            let _ = write!(out, " data-rack-position=\"{}\"", position);
        }
        out.push_str(">\n");
        write_primitives(&mut out, object.surface.primitives(), "    ");
        out.push_str("  </g>\n");
    }

    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tests::object;
    use crate::scene::ViewMetadata;

    #[test]
    fn test_empty_scene_uses_view_size() {
        let scene = Scene::new(ViewMetadata {
            zoom: 1.0,
            width: 800.0,
            height: 600.0,
        });
        let svg = export_svg(&scene);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"800\" height=\"600\""));
        assert!(!svg.contains("<g "));
    }

    #[test]
    fn test_objects_become_groups() {
        let mut scene = Scene::new(ViewMetadata {
            zoom: 1.0,
            width: 100.0,
            height: 100.0,
        });
        let mut panel = object("patch-panels", "Patch <A>", 1);
        panel.x = 10.0;
        panel.y = 20.0;
        panel.rack_position = Some(3);
        scene.add(panel);

        let svg = export_svg(&scene);
        assert!(svg.contains("transform=\"translate(10 20) scale(1)\""));
        assert!(svg.contains("data-name=\"Patch &lt;A&gt;\""));
        assert!(svg.contains("data-rack-position=\"3\""));
        // grown to cover the 480px wide object
        assert_eq!(document_bounds(&scene), Rect::new(0.0, 0.0, 490.0, 100.0));
    }

    #[test]
    fn test_negative_positions_move_origin() {
        let mut scene = Scene::new(ViewMetadata {
            zoom: 1.0,
            width: 800.0,
            height: 600.0,
        });
        let mut panel = object("patch-panels", "Patch Panel", 1);
        panel.x = -50.0;
        panel.y = -20.0;
        scene.add(panel);

        assert_eq!(
            document_bounds(&scene),
            Rect::new(-50.0, -20.0, 850.0, 620.0)
        );
        let svg = export_svg(&scene);
        assert!(svg.contains("viewBox=\"-50 -20 850 620\""));
        assert!(svg.contains("<rect x=\"-50\" y=\"-20\" width=\"850\" height=\"620\" fill=\"#ffffff\"/>"));
    }
}
