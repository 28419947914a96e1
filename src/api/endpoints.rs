use super::models::Folder;

pub const ID_PARAM: &str = ":id";
pub const NAME_PARAM: &str = ":name";

/// Fills `:name` placeholders in an endpoint template.
pub fn render(template: &str, params: &[(&str, &str)]) -> String {
    let mut path = template.to_string();
    for (name, value) in params {
        path = path.replace(name, value);
    }
    path
}

pub fn letter_path(template: &str, id: i64) -> String {
    let id = id.to_string();
    render(template, &[(ID_PARAM, id.as_str())])
}

pub fn folder_path(template: &str, folder: &Folder) -> String {
    render(template, &[(NAME_PARAM, folder.wire_name())])
}

pub fn list_query(folder: Option<&Folder>) -> Vec<(String, String)> {
    match folder {
        Some(folder) => vec![("folder".to_string(), folder.wire_name().to_string())],
        None => Vec::new(),
    }
}
