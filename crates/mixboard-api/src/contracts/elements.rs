use serde_json::{Map, Value};

use mixboard_types::api::{CreateElementRequest, Geometry, UpdateElementRequest};
use mixboard_types::models::{
    CommentPinData, ElementData, ElementKind, ImageData, LinkData, NoteColor, NoteData, PdfData,
    TodoData, TodoItem,
};

use super::{Checker, ContractResult, at, root};

const GEOMETRY_FIELDS: [&str; 4] = ["position_x", "position_y", "width", "height"];

/// `type` picks which data contract applies. An unknown `type` fails here
/// and `data` is then reported only if it is missing altogether.
pub fn create_element(body: &Value) -> ContractResult<CreateElementRequest> {
    let obj = root(body)?;
    let mut c = Checker::default();

    let kind = c
        .required(obj, "", "type")
        .and_then(|v| c.literal(v, "type", &ElementKind::ALL, ElementKind::as_str));

    let [x, y, w, h] = GEOMETRY_FIELDS.map(|key| c.required(obj, "", key).and_then(|v| c.number(v, key)));

    let data_value = c.required(obj, "", "data");
    let data = match (kind, data_value) {
        (Some(kind), Some(value)) => element_data(&mut c, kind, value, "data"),
        _ => None,
    };

    let request = (|| -> Option<CreateElementRequest> {
        Some(CreateElementRequest {
            geometry: Geometry {
                position_x: x?,
                position_y: y?,
                width: w?,
                height: h?,
            },
            data: data?,
        })
    })();
    c.finish(request)
}

/// Partial update. `data`, when present, must match the contract of the
/// element's stored type; an update can never change what kind an element is.
pub fn update_element(body: &Value, stored: ElementKind) -> ContractResult<UpdateElementRequest> {
    let obj = root(body)?;
    let mut c = Checker::default();

    let [x, y, w, h] =
        GEOMETRY_FIELDS.map(|key| obj.get(key).and_then(|v| c.number(v, key)));

    if let Some(given) = obj.get("type") {
        if given.as_str() != Some(stored.as_str()) {
            c.fail("type", format!("Element type cannot change from '{}'", stored));
        }
    }

    let data = obj.get("data").and_then(|v| element_data(&mut c, stored, v, "data"));

    c.finish(Some(UpdateElementRequest {
        position_x: x,
        position_y: y,
        width: w,
        height: h,
        data,
    }))
}

/// Dispatch to the data contract for `kind`. Adding a kind without a contract
/// does not compile.
fn element_data(c: &mut Checker, kind: ElementKind, value: &Value, path: &str) -> Option<ElementData> {
    let obj = c.object(value, path)?;
    match kind {
        ElementKind::Note => note(c, obj, path).map(ElementData::Note),
        ElementKind::Todo => todo(c, obj, path).map(ElementData::Todo),
        ElementKind::Image => image(c, obj, path).map(ElementData::Image),
        ElementKind::Pdf => pdf(c, obj, path).map(ElementData::Pdf),
        ElementKind::Link => link(c, obj, path).map(ElementData::Link),
        ElementKind::CommentPin => comment_pin(c, obj, path).map(ElementData::CommentPin),
    }
}

fn note(c: &mut Checker, obj: &Map<String, Value>, path: &str) -> Option<NoteData> {
    let text = c.required(obj, path, "text").and_then(|v| c.string(v, &at(path, "text")));
    let color = c
        .required(obj, path, "color")
        .and_then(|v| c.literal(v, &at(path, "color"), &NoteColor::ALL, NoteColor::as_str));

    Some(NoteData {
        text: text?,
        color: color?,
    })
}

fn todo(c: &mut Checker, obj: &Map<String, Value>, path: &str) -> Option<TodoData> {
    let title = Checker::optional(obj, "title").and_then(|v| c.string(v, &at(path, "title")));

    let items_path = at(path, "items");
    let items = c
        .required(obj, path, "items")
        .and_then(|v| c.array(v, &items_path))
        .map(|values| {
            values
                .iter()
                .enumerate()
                .map(|(i, v)| todo_item(c, v, &at(&items_path, i)))
                .collect::<Vec<_>>()
        });

    // A single bad item fails the list, but every item is still checked.
    let items = items?.into_iter().collect::<Option<Vec<_>>>()?;

    Some(TodoData { title, items })
}

fn todo_item(c: &mut Checker, value: &Value, path: &str) -> Option<TodoItem> {
    let obj = c.object(value, path)?;
    let id = c.required(obj, path, "id").and_then(|v| c.non_empty(v, &at(path, "id")));
    let text = c.required(obj, path, "text").and_then(|v| c.string(v, &at(path, "text")));
    let completed = c
        .required(obj, path, "completed")
        .and_then(|v| c.boolean(v, &at(path, "completed")));

    Some(TodoItem {
        id: id?,
        text: text?,
        completed: completed?,
    })
}

fn image(c: &mut Checker, obj: &Map<String, Value>, path: &str) -> Option<ImageData> {
    let url = c.required(obj, path, "url").and_then(|v| c.url(v, &at(path, "url")));
    let file_name = c
        .required(obj, path, "fileName")
        .and_then(|v| c.non_empty(v, &at(path, "fileName")));
    let thumbnail_url =
        Checker::optional(obj, "thumbnailUrl").and_then(|v| c.url(v, &at(path, "thumbnailUrl")));

    Some(ImageData {
        url: url?,
        file_name: file_name?,
        thumbnail_url,
    })
}

fn pdf(c: &mut Checker, obj: &Map<String, Value>, path: &str) -> Option<PdfData> {
    let url = c.required(obj, path, "url").and_then(|v| c.url(v, &at(path, "url")));
    let file_name = c
        .required(obj, path, "fileName")
        .and_then(|v| c.non_empty(v, &at(path, "fileName")));
    let page_count = c
        .required(obj, path, "pageCount")
        .and_then(|v| c.positive_int(v, &at(path, "pageCount")));

    Some(PdfData {
        url: url?,
        file_name: file_name?,
        page_count: page_count?,
    })
}

fn link(c: &mut Checker, obj: &Map<String, Value>, path: &str) -> Option<LinkData> {
    let url = c.required(obj, path, "url").and_then(|v| c.url(v, &at(path, "url")));
    let title = c.required(obj, path, "title").and_then(|v| c.string(v, &at(path, "title")));

    Some(LinkData {
        url: url?,
        title: title?,
    })
}

fn comment_pin(c: &mut Checker, obj: &Map<String, Value>, path: &str) -> Option<CommentPinData> {
    let thread_id = c
        .required(obj, path, "threadId")
        .and_then(|v| c.non_empty(v, &at(path, "threadId")));
    let user_initial = c
        .required(obj, path, "userInitial")
        .and_then(|v| c.non_empty(v, &at(path, "userInitial")));

    Some(CommentPinData {
        thread_id: thread_id?,
        user_initial: user_initial?,
    })
}
