// Tests for cross-file resolution: mounted routers behind import aliases,
// re-export chains, namespace member handlers and cycle pruning.
use endpoints_from_source::{
    endpoint::{FieldKind, HttpMethod},
    locator::RouteLocator,
    semantic::SemanticModel,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn create_project(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let mut entry = PathBuf::new();
    for (i, (path, content)) in files.iter().enumerate() {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
        if i == 0 {
            entry = file_path;
        }
    }
    (temp_dir, entry)
}

#[test]
fn test_mount_through_reexport_chain() {
    let (_temp_dir, entry) = create_project(&[
        (
            "server.ts",
            r#"
import { authRouter } from './routes';
app.use("/api", authRouter);
"#,
        ),
        ("routes/index.ts", "export { authRouter } from './auth';"),
        (
            "routes/auth.ts",
            r#"
export const authRouter = Router();
const login = (req, res) => {
    const { email } = req.body;
};
authRouter.post("/login", login);
"#,
        ),
    ]);

    let model = SemanticModel::load(&entry).expect("Failed to load project");
    let endpoints = RouteLocator::new(&model).locate();

    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].method, Some(HttpMethod::Post));
    assert_eq!(endpoints[0].path, "/api/login");
    assert!(endpoints[0].body.contains_key("email"));
}

#[test]
fn test_namespace_import_member_handler() {
    let (_temp_dir, entry) = create_project(&[
        (
            "server.ts",
            r#"
import * as handlers from './handlers';
router.post("/signup", handlers.signup);
"#,
        ),
        (
            "handlers.ts",
            r#"
export const signup = (req, res) => {
    const { email, password } = req.body;
};
"#,
        ),
    ]);

    let model = SemanticModel::load(&entry).expect("Failed to load project");
    let endpoints = RouteLocator::new(&model).locate();

    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].path, "/signup");
    assert_eq!(endpoints[0].handler_name.as_deref(), Some("signup"));
    let keys: Vec<_> = endpoints[0].body.keys().collect();
    assert_eq!(keys, vec!["email", "password"]);
}

#[test]
fn test_handler_type_declared_in_other_module() {
    let (_temp_dir, entry) = create_project(&[
        (
            "server.ts",
            r#"
import { createPet } from './pets';
router.post("/pets", createPet);
"#,
        ),
        (
            "pets.ts",
            r#"
import { PetBody } from './models';
export const createPet = (req: Typed<{}, {}, PetBody>, res) => {
    res.send();
};
"#,
        ),
        (
            "models.ts",
            "export interface PetBody { name: string; age?: number; }",
        ),
    ]);

    let model = SemanticModel::load(&entry).expect("Failed to load project");
    let endpoints = RouteLocator::new(&model).locate();

    assert_eq!(endpoints.len(), 1);
    let name = endpoints[0].body.get("name").unwrap().as_ref().unwrap();
    assert_eq!(name.kind, FieldKind::Primitive("string".to_string()));
    assert!(!name.is_optional);
    let age = endpoints[0].body.get("age").unwrap().as_ref().unwrap();
    assert_eq!(age.kind, FieldKind::Primitive("number".to_string()));
    assert!(age.is_optional);
}

#[test]
fn test_external_dependency_handler_still_emits_endpoint() {
    let (_temp_dir, entry) = create_project(&[(
        "server.ts",
        r#"
import { externalHandler } from 'some-package';
router.get("/external", externalHandler);
"#,
    )]);

    let model = SemanticModel::load(&entry).expect("Failed to load project");
    let endpoints = RouteLocator::new(&model).locate();

    // The package is not analyzable; the endpoint is recorded bare.
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].method, Some(HttpMethod::Get));
    assert_eq!(endpoints[0].path, "/external");
    assert!(endpoints[0].body.is_empty());
    assert!(endpoints[0].response.is_empty());
}

#[test]
fn test_mutual_mounts_are_pruned() {
    let (_temp_dir, entry) = create_project(&[
        (
            "a.ts",
            r#"
import { routerB } from './b';
export const routerA = Router();
const ping = (req, res) => {};
routerA.get("/ping", ping);
app.use("/b", routerB);
"#,
        ),
        (
            "b.ts",
            r#"
import { routerA } from './a';
export const routerB = Router();
app.use("/a", routerA);
"#,
        ),
    ]);

    let model = SemanticModel::load(&entry).expect("Failed to load project");
    // Must terminate despite a mounts b mounting a.
    let endpoints = RouteLocator::new(&model).locate();

    let paths: Vec<_> = endpoints.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["/ping"]);
}

#[test]
fn test_sibling_mounts_of_same_module() {
    let (_temp_dir, entry) = create_project(&[
        (
            "server.ts",
            r#"
import { shared } from './shared';
app.use("/v1", shared);
app.use("/v2", shared);
"#,
        ),
        (
            "shared.ts",
            r#"
export const shared = Router();
const status = (req, res) => {};
shared.get("/status", status);
"#,
        ),
    ]);

    let model = SemanticModel::load(&entry).expect("Failed to load project");
    let endpoints = RouteLocator::new(&model).locate();

    // The same module may be mounted under several prefixes.
    let paths: Vec<_> = endpoints.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["/v1/status", "/v2/status"]);
}
