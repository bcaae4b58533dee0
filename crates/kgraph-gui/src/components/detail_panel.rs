use eframe::egui;
use egui_phosphor::regular as ph;
use kgraph_canvas::EditorDocument;
use kgraph_core::{EdgeUpdate, NodeType};
use kgraph_events::{Event, EventBus};

/// Side panel editing whatever is selected on the canvas.
pub fn show(ui: &mut egui::Ui, doc: &mut EditorDocument, bus: &EventBus) {
    if let Some(id) = doc.selected_node().cloned() {
        let Some(node) = doc.node(&id).cloned() else {
            return;
        };
        ui.heading(format!("{} Node", ph::RECTANGLE));
        ui.weak(id.as_str());
        ui.separator();

        let mut label = node.label.clone();
        let mut sub_type = node.sub_type.clone();
        let mut node_type = node.node_type;
        let mut description = node.data.description.clone().unwrap_or_default();

        egui::Grid::new("node_details").num_columns(2).show(ui, |ui| {
            ui.label("Label");
            ui.text_edit_singleline(&mut label);
            ui.end_row();

            ui.label("Type");
            egui::ComboBox::from_id_salt("node_type")
                .selected_text(node_type.label())
                .show_ui(ui, |ui| {
                    for option in [NodeType::Technical, NodeType::Business] {
                        ui.selectable_value(&mut node_type, option, option.label());
                    }
                });
            ui.end_row();

            ui.label("Sub-type");
            ui.text_edit_singleline(&mut sub_type);
            ui.end_row();
        });
        ui.label("Description");
        ui.text_edit_multiline(&mut description);

        if label != node.label
            || sub_type != node.sub_type
            || node_type != node.node_type
            || description != node.data.description.clone().unwrap_or_default()
        {
            let result = doc.update_node(&id, |node| {
                node.label = label;
                node.sub_type = sub_type;
                node.node_type = node_type;
                node.data.description = (!description.is_empty()).then_some(description);
            });
            if let Err(e) = result {
                tracing::warn!("Node edit rejected: {}", e);
            }
        }

        ui.separator();
        if ui.button(format!("{} Delete node", ph::TRASH)).clicked() {
            bus.publish(Event::DeleteSelection);
        }
    } else if let Some(id) = doc.selected_edge().cloned() {
        let Some(edge) = doc.edge(&id).cloned() else {
            return;
        };
        ui.heading(format!("{} Edge", ph::ARROW_RIGHT));
        ui.weak(format!("{} → {}", edge.source, edge.target));
        ui.separator();

        let mut label = edge.label.clone();
        ui.horizontal(|ui| {
            ui.label("Label");
            ui.text_edit_singleline(&mut label);
        });
        if label != edge.label {
            bus.publish(Event::EdgeUpdate {
                id: id.clone(),
                update: EdgeUpdate::label(label),
            });
        }
        if edge.control.is_some() && ui.button("Reset curve").clicked() {
            bus.publish(Event::EdgeUpdate {
                id: id.clone(),
                update: EdgeUpdate::reset_control(),
            });
        }

        ui.separator();
        if ui.button(format!("{} Delete edge", ph::TRASH)).clicked() {
            bus.publish(Event::DeleteSelection);
        }
    } else {
        ui.weak("Nothing selected.");
        ui.label(format!(
            "{} nodes, {} edges",
            doc.nodes().len(),
            doc.edges().len()
        ));
    }
}
