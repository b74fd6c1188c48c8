#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::docs::{self, DocInfo};
use crate::naming::resolve;
use crate::request::MethodPolicy;
use crate::routes::{scaffold, synthesize, CrudMethod, RouteOptions};
use crate::schema::{normalize, DatabaseKind, RawField, RawResource, RawSchema, SchemaModel};

fn schema() -> SchemaModel {
    let raw = RawSchema {
        database: DatabaseKind::Mysql,
        resources: vec![
            RawResource {
                name: "donor".into(),
                fields: vec![
                    RawField::new("id", "int(11)").primary_key().auto_increment(),
                    RawField::new("name", "varchar(100)"),
                    RawField::new("phone", "varchar(20)").nullable(),
                    RawField::new("registered_at", "datetime").nullable(),
                ],
            },
            RawResource {
                name: "invoice".into(),
                fields: vec![
                    RawField::new("id", "int(11)").primary_key().auto_increment(),
                    RawField::new("total", "decimal(10,2)"),
                ],
            },
        ],
    };
    normalize(&raw).unwrap().schema
}

struct Rendered {
    files: Vec<RenderedFile>,
}

impl Rendered {
    fn file(&self, path: &str) -> &str {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.content.as_str())
            .unwrap_or_else(|| panic!("{path} was not rendered"))
    }

    fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }
}

fn render_family(family: TargetFamily, auth: Option<AuthConfig>, include_docs: bool) -> Rendered {
    render_schema(&schema(), family, auth, include_docs)
}

fn render_schema(
    schema: &SchemaModel,
    family: TargetFamily,
    auth: Option<AuthConfig>,
    include_docs: bool,
) -> Rendered {
    let selected: Vec<&Resource> = schema.resources.iter().collect();
    let mut warnings = Vec::new();
    let resolution = resolve(&selected, family, &mut warnings).unwrap();
    let options = GenerationOptions::default();
    let mut routes = synthesize(
        &selected,
        &resolution,
        &RouteOptions {
            base_path: options.base_path.clone(),
            update_policy: options.update_policy,
        },
    )
    .unwrap();
    if let Some(config) = &auth {
        scaffold(&mut routes, config, &options.base_path);
    }
    let doc = docs::synthesize(
        &routes,
        &DocInfo {
            title: &options.project_name,
            version: &options.project_version,
            description: "",
        },
    );
    let input = RenderInput {
        family,
        mapper: TypeMapper::new(),
        options: &options,
        auth: auth.as_ref(),
        include_docs,
        database: schema.database,
        resources: &selected,
        resolution: &resolution,
        routes: &routes,
        openapi: include_docs.then_some(&doc),
    };
    Rendered {
        files: render(&input).unwrap(),
    }
}

fn invoice_auth() -> AuthConfig {
    AuthConfig::new("s3cret", 3600)
        .with_method(CrudMethod::List, MethodPolicy::open())
        .with_method(CrudMethod::Get, MethodPolicy::open())
        .with_method(CrudMethod::Delete, MethodPolicy::roles(["admin"]))
}

#[test]
fn test_environment_compiles_every_template() {
    let env = environment().unwrap();
    for (name, _) in TEMPLATE_SOURCES {
        assert!(env.get_template(name).is_ok(), "{name}");
    }
}

#[test]
fn test_every_layout_template_is_embedded() {
    for family in TargetFamily::ALL {
        for rule in layout(family) {
            if let Source::Template(name) = rule.source {
                assert!(
                    TEMPLATE_SOURCES.iter().any(|(n, _)| *n == name),
                    "{family}: {name}"
                );
            }
        }
    }
}

#[test]
fn test_flask_layout_order() {
    let rendered = render_family(TargetFamily::SyncRouted, None, false);
    assert_eq!(
        rendered.paths(),
        vec![
            "app.py",
            "config.py",
            "store.py",
            "validators.py",
            "models/__init__.py",
            "models/donor.py",
            "models/invoice.py",
            "routes/__init__.py",
            "routes/donor.py",
            "routes/invoice.py",
            "requirements.txt",
            "README.md",
        ]
    );
}

#[test]
fn test_docs_and_auth_rules_are_conditional() {
    let rendered = render_family(TargetFamily::EventLoopRouted, Some(invoice_auth()), true);
    let paths = rendered.paths();
    assert!(paths.contains(&"auth.js"));
    assert!(paths.contains(&"docs/openapi.json"));
    assert!(paths.contains(&"docs/index.html"));
    let doc: Value = serde_json::from_str(rendered.file("docs/openapi.json")).unwrap();
    assert_eq!(doc["openapi"], "3.1.0");
    assert!(rendered.file("docs/index.html").contains("/openapi.json"));
}

#[test]
fn test_flask_routes_gate_before_store() {
    let rendered = render_family(TargetFamily::SyncRouted, Some(invoice_auth()), false);
    let routes = rendered.file("routes/invoice.py");
    assert!(routes.contains("@blueprint.route(\"/invoices/<int:id>\", methods=[\"DELETE\"])"));
    let gate = routes.find("@require_auth([\"admin\"])").unwrap();
    let handler = routes.find("def delete_invoice(id):").unwrap();
    let store_call = routes.find("store.delete(id)").unwrap();
    assert!(gate < handler && handler < store_call);
    // open methods carry no decorator
    assert!(!routes[..routes.find("def list_invoice").unwrap()].contains("@require_auth"));
    assert!(routes.contains("return \"\", 204"));
}

#[test]
fn test_flask_model_checks() {
    let rendered = render_family(TargetFamily::SyncRouted, None, false);
    let model = rendered.file("models/donor.py");
    assert!(model.contains("from validators import is_datetime, validate_payload"));
    assert!(model.contains("KEY = \"id\""));
    assert!(model.contains("KEY_GENERATED = True"));
    assert!(model.contains("\"name\": lambda value: isinstance(value, str),"));
    assert!(model.contains("\"phone\": lambda value: value is None or (isinstance(value, str)),"));
    assert!(model.contains("CREATE_REQUIRED = [\"name\"]"));
    assert!(model.contains("UPDATE_REQUIRED = []"));
    let invoice = rendered.file("models/invoice.py");
    assert!(invoice.contains("from validators import validate_payload"));
}

#[test]
fn test_fastapi_models_and_dependencies() {
    let rendered = render_family(TargetFamily::AsyncRouted, Some(invoice_auth()), false);
    let model = rendered.file("models/donor.py");
    assert!(model.contains("class Donor(BaseModel):"));
    assert!(model.contains("class DonorCreate(BaseModel):"));
    assert!(model.contains("    name: str = Field(..., alias=\"name\", strict=True)"));
    assert!(model.contains("    phone: Optional[str] = Field(None, alias=\"phone\", strict=True)"));
    let routes = rendered.file("routes/invoice.py");
    assert!(routes.contains("dependencies=[Depends(require_roles([\"admin\"]))]"));
    assert!(routes.contains("async def delete_invoice(id: int):"));
    assert!(routes.contains("exclude_unset=True"));
    let main = rendered.file("main.py");
    assert!(main.contains("docs_url=None"));
    assert!(main.contains("app.include_router(auth_router)"));
    assert!(main.contains("app.include_router(invoice_router)"));
}

#[test]
fn test_fastapi_update_rejects_null_for_non_nullable_fields() {
    let rendered = render_family(TargetFamily::AsyncRouted, None, false);
    let model = rendered.file("models/donor.py");
    let update = &model[model.find("class DonorUpdate(BaseModel):").unwrap()..];
    // omitted stays allowed; explicit null only where the column is nullable
    assert!(update.contains("    name: str = Field(None, alias=\"name\", strict=True)"));
    assert!(update.contains("    phone: Optional[str] = Field(None, alias=\"phone\", strict=True)"));
    assert!(!update.contains("Optional[str] = Field(None, alias=\"name\""));
}

#[test]
fn test_express_routes_use_middleware() {
    let rendered = render_family(TargetFamily::EventLoopRouted, Some(invoice_auth()), false);
    let routes = rendered.file("routes/invoice.js");
    assert!(routes.contains("router.delete(\"/invoices/:id\", requireRoles([\"admin\"]), (req, res) => {"));
    assert!(routes.contains("router.get(\"/invoices\", (req, res) => {"));
    let app = rendered.file("app.js");
    assert!(app.contains("const invoiceRoutes = require('./routes/invoice');"));
    assert!(!app.contains("require('path')"));
    let package: Value = serde_json::from_str(rendered.file("package.json")).unwrap();
    assert_eq!(package["name"], "generated-api");
    assert_eq!(package["dependencies"]["express"], "^4.18.2");
}

#[test]
fn test_config_carries_auth_settings_only_with_auth() {
    let open = render_family(TargetFamily::SyncRouted, None, false);
    assert!(!open.file("config.py").contains("SECRET_KEY"));
    assert!(!open.file("config.py").contains("import json"));
    let secured = render_family(TargetFamily::SyncRouted, Some(invoice_auth()), false);
    let config = secured.file("config.py");
    assert!(config.contains("SECRET_KEY = os.environ.get(\"SECRET_KEY\", \"s3cret\")"));
    assert!(config.contains("ROLES = [\"admin\", \"developer\", \"user\"]"));
}

fn event_schema() -> SchemaModel {
    let raw = RawSchema {
        database: DatabaseKind::Mongodb,
        resources: vec![RawResource {
            name: "events".into(),
            fields: vec![RawField::new("title", "string")],
        }],
    };
    normalize(&raw).unwrap().schema
}

#[test]
fn test_manifests_carry_cors_and_database_driver() {
    let flask = render_family(TargetFamily::SyncRouted, None, false);
    let requirements = flask.file("requirements.txt");
    assert!(requirements.contains("flask-cors==4.0.0\n"));
    assert!(requirements.ends_with("PyMySQL==1.1.0\n"));
    assert!(!requirements.contains("pymongo"));

    let fastapi = render_schema(&event_schema(), TargetFamily::AsyncRouted, None, false);
    let requirements = fastapi.file("requirements.txt");
    assert!(requirements.contains("pymongo==4.6.1"));
    assert!(!requirements.contains("PyMySQL"));

    let mysql = render_family(TargetFamily::EventLoopRouted, None, false);
    let package: Value = serde_json::from_str(mysql.file("package.json")).unwrap();
    assert_eq!(package["dependencies"]["cors"], "^2.8.5");
    assert_eq!(package["dependencies"]["mysql2"], "^3.6.5");
    let mongo = render_schema(&event_schema(), TargetFamily::EventLoopRouted, None, false);
    let package: Value = serde_json::from_str(mongo.file("package.json")).unwrap();
    assert_eq!(package["dependencies"]["mongoose"], "^8.0.3");
    assert!(package["dependencies"].get("mysql2").is_none());
}

#[test]
fn test_config_reads_database_url() {
    let flask = render_family(TargetFamily::SyncRouted, None, false);
    assert!(flask.file("config.py").contains(
        "DATABASE_URL = os.environ.get(\"DATABASE_URL\", \"mysql://root@localhost:3306/generated_api\")"
    ));
    let fastapi = render_schema(&event_schema(), TargetFamily::AsyncRouted, None, false);
    assert!(fastapi.file("config.py").contains(
        "MONGODB_URI = os.environ.get(\"MONGODB_URI\", \"mongodb://localhost:27017/generated_api\")"
    ));
    let express = render_schema(&event_schema(), TargetFamily::EventLoopRouted, None, false);
    assert!(express.file("config.js").contains(
        "  databaseUrl: process.env.MONGODB_URI || \"mongodb://localhost:27017/generated_api\","
    ));
    assert!(express.file("README.md").contains("read from a MongoDB database"));
}

#[test]
fn test_entry_points_enable_cors() {
    let flask = render_family(TargetFamily::SyncRouted, None, false);
    let app = flask.file("app.py");
    assert!(app.contains("from flask_cors import CORS\n"));
    assert!(app.find("app = Flask(__name__)\nCORS(app)\n").is_some());

    let fastapi = render_family(TargetFamily::AsyncRouted, None, false);
    let main = fastapi.file("main.py");
    assert!(main.contains("from fastapi.middleware.cors import CORSMiddleware"));
    assert!(main.contains("app.add_middleware(\n    CORSMiddleware,\n    allow_origins=[\"*\"],"));

    let express = render_family(TargetFamily::EventLoopRouted, None, false);
    let app = express.file("app.js");
    assert!(app.contains("const cors = require('cors');"));
    assert!(app.contains("app.use(cors());\napp.use(express.json());"));
}

#[test]
fn test_readme_lists_endpoints_and_auth() {
    let rendered = render_family(TargetFamily::SyncRouted, Some(invoice_auth()), true);
    let readme = rendered.file("README.md");
    assert!(readme.starts_with("# generated_api\n"));
    assert!(readme.contains("python app.py"));
    assert!(readme.contains("| DELETE | `/invoices/{id}` | Delete a Invoice | roles: admin |"));
    assert!(readme.contains("| POST | `/auth/token` |"));
    assert!(readme.contains("## Authentication"));
    assert!(readme.contains("`/openapi.json`"));
}

#[test]
fn test_render_is_deterministic() {
    let a = render_family(TargetFamily::AsyncRouted, Some(invoice_auth()), true);
    let b = render_family(TargetFamily::AsyncRouted, Some(invoice_auth()), true);
    assert_eq!(a.files, b.files);
}

#[test]
fn test_strict_mapper_turns_unknown_into_render_error() {
    let raw = RawSchema {
        database: DatabaseKind::Mysql,
        resources: vec![RawResource {
            name: "asset".into(),
            fields: vec![
                RawField::new("id", "int(11)").primary_key().auto_increment(),
                RawField::new("shape", "geometry"),
            ],
        }],
    };
    let schema = normalize(&raw).unwrap().schema;
    let selected: Vec<&Resource> = schema.resources.iter().collect();
    let mut warnings = Vec::new();
    let resolution = resolve(&selected, TargetFamily::AsyncRouted, &mut warnings).unwrap();
    let options = GenerationOptions::default();
    let routes = synthesize(&selected, &resolution, &RouteOptions::default()).unwrap();
    let input = RenderInput {
        family: TargetFamily::AsyncRouted,
        mapper: TypeMapper::strict(),
        options: &options,
        auth: None,
        include_docs: false,
        database: schema.database,
        resources: &selected,
        resolution: &resolution,
        routes: &routes,
        openapi: None,
    };
    let err = render(&input).unwrap_err();
    assert_eq!(err.kind(), crate::error::ErrorKind::RenderError);
}
