use endpoints_from_source::{
    decorator,
    endpoint::{Endpoint, FieldKind, HttpMethod},
    locator::RouteLocator,
    postman::{PostmanBuilder, ValueDefaults},
    printer,
    semantic::SemanticModel,
};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper function to materialize the fixture project in a temp directory
fn create_fixture_project() -> (TempDir, PathBuf) {
    let files = vec![
        ("server.ts", include_str!("fixtures/server.ts")),
        ("routes/auth.ts", include_str!("fixtures/routes/auth.ts")),
        ("routes/users.ts", include_str!("fixtures/routes/users.ts")),
        ("types.ts", include_str!("fixtures/types.ts")),
        ("models/user.ts", include_str!("fixtures/models/user.ts")),
    ];

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write fixture file");
    }

    let entry = temp_dir.path().join("server.ts");
    (temp_dir, entry)
}

fn discover(entry: &PathBuf) -> Vec<Endpoint> {
    let model = SemanticModel::load(entry).expect("Failed to load fixture project");
    RouteLocator::new(&model).locate()
}

#[test]
fn test_end_to_end_discovery() {
    let (_temp_dir, entry) = create_fixture_project();

    let model = SemanticModel::load(&entry).expect("Failed to load fixture project");
    assert_eq!(model.module_count(), 5, "Should load the full import closure");

    let endpoints = RouteLocator::new(&model).locate();

    let listing: Vec<(Option<HttpMethod>, &str)> = endpoints
        .iter()
        .map(|e| (e.method, e.path.as_str()))
        .collect();
    assert_eq!(
        listing,
        vec![
            (Some(HttpMethod::Get), "/health"),
            (Some(HttpMethod::Post), "/api/auth/login"),
            (Some(HttpMethod::Post), "/api/auth/register"),
            (Some(HttpMethod::Get), "/api/users/"),
            (Some(HttpMethod::Get), "/api/users/:id"),
            (Some(HttpMethod::Post), "/api/users/"),
        ],
    );
}

#[test]
fn test_paths_never_contain_doubled_separators() {
    let (_temp_dir, entry) = create_fixture_project();
    let endpoints = discover(&entry);

    // The users router is mounted with a trailing slash and registers "/"
    // paths; normalization must swallow the doubled separator.
    for endpoint in &endpoints {
        assert!(
            !endpoint.path.contains("//"),
            "Path contains doubled separator: {}",
            endpoint.path
        );
    }
}

#[test]
fn test_fallback_body_extraction_from_destructuring() {
    let (_temp_dir, entry) = create_fixture_project();
    let endpoints = discover(&entry);

    let login = endpoints
        .iter()
        .find(|e| e.path == "/api/auth/login")
        .expect("Should find login endpoint");

    let keys: Vec<_> = login.body.keys().collect();
    assert_eq!(keys, vec!["email", "password"]);
    for (_, ty) in login.body.iter() {
        let ty = ty.as_ref().expect("Fallback fields have a default type");
        assert_eq!(ty.kind, FieldKind::Primitive("string".to_string()));
        assert!(ty.is_optional, "Destructured request fields are optional");
    }

    // Direct property accesses feed query and headers.
    assert_eq!(login.query.keys().collect::<Vec<_>>(), vec!["redirect"]);
    let header_keys: Vec<_> = login.headers.keys().collect();
    assert_eq!(header_keys, vec!["content-type", "authorization"]);

    assert_eq!(login.handler_name.as_deref(), Some("login"));
    let tags = login.doc_tags.as_ref().expect("Login carries JSDoc tags");
    assert_eq!(tags.get("name").map(String::as_str), Some("login"));
}

#[test]
fn test_declared_generic_body_takes_precedence() {
    let (_temp_dir, entry) = create_fixture_project();
    let endpoints = discover(&entry);

    let create = endpoints
        .iter()
        .find(|e| e.path == "/api/users/" && e.method == Some(HttpMethod::Post))
        .expect("Should find create-user endpoint");

    let keys: Vec<_> = create.body.keys().collect();
    assert_eq!(keys, vec!["name", "email", "role"]);

    let name = create.body.get("name").unwrap().as_ref().unwrap();
    assert_eq!(name.kind, FieldKind::Primitive("string".to_string()));
    assert!(!name.is_optional);

    let role = create.body.get("role").unwrap().as_ref().unwrap();
    assert!(role.is_optional, "role is declared with `?`");
    let FieldKind::Enum(members) = &role.kind else {
        panic!("role should resolve to the enum shape, got {:?}", role.kind);
    };
    assert_eq!(members[0].0, "Admin");
    assert_eq!(members[0].1.kind, FieldKind::Literal("admin".to_string()));
}

#[test]
fn test_inline_generic_body_slot() {
    let (_temp_dir, entry) = create_fixture_project();
    let endpoints = discover(&entry);

    let get_user = endpoints
        .iter()
        .find(|e| e.path == "/api/users/:id")
        .expect("Should find get-user endpoint");

    assert_eq!(get_user.method, Some(HttpMethod::Get));
    let id = get_user.body.get("id").unwrap().as_ref().unwrap();
    assert_eq!(id.kind, FieldKind::Primitive("string".to_string()));
    assert!(!id.is_optional);
}

#[test]
fn test_response_shapes_from_declared_types() {
    let (_temp_dir, entry) = create_fixture_project();
    let endpoints = discover(&entry);

    // listUsers responds with { users: User[], total: number }.
    let list = endpoints
        .iter()
        .find(|e| e.path == "/api/users/" && e.method == Some(HttpMethod::Get))
        .expect("Should find list-users endpoint");

    let users = list.response.get("users").unwrap().as_ref().unwrap();
    let FieldKind::Array(Some(items)) = &users.kind else {
        panic!("users should be an array, got {:?}", users.kind);
    };
    let FieldKind::Object(properties) = &items.kind else {
        panic!("array items should expand to the User object");
    };
    let created_at = properties
        .iter()
        .find(|(n, _)| n == "createdAt")
        .map(|(_, t)| t)
        .unwrap();
    assert_eq!(created_at.kind, FieldKind::Primitive("Date".to_string()));

    let total = list.response.get("total").unwrap().as_ref().unwrap();
    assert_eq!(total.kind, FieldKind::Primitive("number".to_string()));

    // createUser responds with the full User object.
    let create = endpoints
        .iter()
        .find(|e| e.path == "/api/users/" && e.method == Some(HttpMethod::Post))
        .unwrap();
    let tags = create.response.get("tags").unwrap().as_ref().unwrap();
    let FieldKind::Array(Some(items)) = &tags.kind else {
        panic!("tags should be an array");
    };
    assert_eq!(items.kind, FieldKind::Primitive("string".to_string()));
}

#[test]
fn test_discovery_is_idempotent() {
    let (_temp_dir, entry) = create_fixture_project();

    let model = SemanticModel::load(&entry).unwrap();
    let first = RouteLocator::new(&model).locate();
    let second = RouteLocator::new(&model).locate();
    assert_eq!(first, second);

    // A fresh model over the unchanged sources agrees as well.
    let model = SemanticModel::load(&entry).unwrap();
    let third = RouteLocator::new(&model).locate();
    assert_eq!(first, third);
}

#[test]
fn test_console_listing_format() {
    let (_temp_dir, entry) = create_fixture_project();
    let endpoints = discover(&entry);

    let listing = printer::format_endpoints(&endpoints);

    assert!(listing.contains("[GET] /health"));
    assert!(listing.contains("[POST] /api/auth/login"));
    assert!(listing.contains("  body:"));
    assert!(listing.contains("    email?: string"));
    assert!(listing.contains("  query: redirect"));
    assert!(listing.contains("  headers: content-type, authorization"));
    assert!(listing.contains("  response:"));
    // GET endpoints list no body block even when a body shape is known.
    let health_block: Vec<&str> = listing
        .split("\n\n")
        .filter(|block| block.starts_with("[GET] /health"))
        .collect();
    assert_eq!(health_block.len(), 1);
    assert!(!health_block[0].contains("body:"));
}

#[test]
fn test_postman_collection_structure() {
    let (_temp_dir, entry) = create_fixture_project();
    let endpoints = discover(&entry);

    let builder = PostmanBuilder::new(ValueDefaults::default());
    let collection = builder.build("Fixture API", &endpoints);
    let value = serde_json::to_value(&collection).expect("Collection serializes");

    assert_eq!(value["info"]["name"], "Fixture API");
    assert!(value["info"]["schema"]
        .as_str()
        .unwrap()
        .contains("v2.1.0"));

    // Requests are sorted by path: /api/... folders come before /health.
    let top: Vec<&str> = value["item"]
        .as_array()
        .unwrap()
        .iter()
        .map(|node| node["name"].as_str().unwrap())
        .collect();
    assert_eq!(top[0], "api");
    assert!(top.contains(&"health"));

    // The login request sits under api/auth and carries bearer auth from
    // its authorization header.
    let api = &value["item"][0]["item"];
    let auth_folder = api
        .as_array()
        .unwrap()
        .iter()
        .find(|node| node["name"] == "auth")
        .expect("auth folder exists");
    let login = auth_folder["item"]
        .as_array()
        .unwrap()
        .iter()
        .find(|node| node["name"] == "login")
        .expect("login request exists");
    assert_eq!(login["request"]["method"], "POST");
    assert_eq!(login["request"]["auth"]["type"], "bearer");
    assert_eq!(
        login["request"]["url"]["raw"],
        "{{baseUrl}}/api/auth/login"
    );
    let raw_body = login["request"]["body"]["raw"].as_str().unwrap();
    assert!(raw_body.contains("\"email\""));
    assert!(raw_body.contains("\"password\""));
}

#[test]
fn test_decorator_file_generation() {
    let (temp_dir, entry) = create_fixture_project();
    let endpoints = discover(&entry);

    let output = temp_dir.path().join("route-types.generated.ts");
    let written = decorator::write_route_types(&output, &endpoints).expect("Writes route types");

    let content = std::fs::read_to_string(&written).unwrap();
    assert!(content.starts_with("import { ObjectParameters }"));
    assert!(content.contains("\"post /api/auth/login\":"));
    assert!(content.contains("\"post /api/auth/register\":"));
    // Endpoints without a body are omitted.
    assert!(!content.contains("/health"));
}
