use catalog_server::entity::{brand, category};
use catalog_server::extractors::auth::MODEL_DELETE;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::Value;

use crate::common::{ModelForm, TestApp, routes, str_of, token_with};

fn model_names(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("expected an array")
        .iter()
        .map(|m| str_of(m, "model_name").to_string())
        .collect()
}

fn priced(name: &str, engine: &str, price: &str) -> ModelForm {
    ModelForm::default()
        .text("modelName", name)
        .text("vehicleType", "Car")
        .text("category", "Sedan")
        .text("brand", "Honda")
        .text("engineType", engine)
        .text("startingPrice", price)
}

async fn honda_id(app: &TestApp) -> i32 {
    brand::Entity::find()
        .filter(brand::Column::Name.eq("Honda"))
        .one(&app.db)
        .await
        .unwrap()
        .expect("Honda is seeded")
        .id
}

#[tokio::test]
async fn brand_listing_puts_electric_first_then_cheapest() {
    let app = TestApp::spawn().await;
    app.publish(&priced("Accord", "Petrol", "30000")).await;
    app.publish(&priced("Prologue", "Electric", "48000")).await;
    app.publish(&priced("Civic", "Petrol", "24500")).await;
    app.publish(&priced("Prototype", "Petrol", "10000").text("status", "draft"))
        .await;

    let res = app
        .get_without_token(&routes::brand_models(honda_id(&app).await))
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(model_names(&res.body), ["Prologue", "Civic", "Accord"]);
    assert_eq!(res.body[0]["model_image"], "/images/placeholder.png");
}

#[tokio::test]
async fn category_listing_includes_drafts() {
    let app = TestApp::spawn().await;
    app.publish(&priced("Accord", "Petrol", "30000")).await;
    app.publish(&priced("Prototype", "Petrol", "10000").text("status", "draft"))
        .await;

    let sedan = category::Entity::find()
        .filter(category::Column::Name.eq("Sedan"))
        .one(&app.db)
        .await
        .unwrap()
        .expect("Sedan is seeded");

    let res = app
        .get_without_token(&routes::category_models(sedan.id))
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(model_names(&res.body), ["Prototype", "Accord"]);
}

#[tokio::test]
async fn popular_returns_newest_listed_models() {
    let app = TestApp::spawn().await;
    for name in ["Fit", "Civic", "Accord", "Pilot", "Odyssey"] {
        app.publish(&priced(name, "Petrol", "20000")).await;
    }
    app.publish(&priced("Prototype", "Petrol", "10000").text("status", "draft"))
        .await;

    let res = app.get_without_token(routes::POPULAR).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(model_names(&res.body), ["Odyssey", "Pilot", "Accord", "Civic"]);

    let res = app
        .get_without_token(&format!("{}?limit=2", routes::POPULAR))
        .await;
    assert_eq!(model_names(&res.body), ["Odyssey", "Pilot"]);
}

#[tokio::test]
async fn list_filters_by_status() {
    let app = TestApp::spawn().await;
    app.publish(&priced("Civic", "Petrol", "24500")).await;
    app.publish(&priced("Prototype", "Petrol", "10000").text("status", "draft"))
        .await;

    let res = app.get_without_token(routes::MODELS).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body.as_array().map(Vec::len), Some(2));

    let res = app
        .get_without_token(&format!("{}?status=draft", routes::MODELS))
        .await;
    assert_eq!(model_names(&res.body), ["Prototype"]);
    assert_eq!(res.body[0]["status"], "draft");
}

#[tokio::test]
async fn form_options_lists_lookups_by_name() {
    let app = TestApp::spawn().await;

    let res = app
        .get_with_token(routes::FORM_OPTIONS, &token_with(&[MODEL_DELETE]))
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let brands: Vec<&str> = res.body["brands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| str_of(b, "name"))
        .collect();
    assert_eq!(brands, ["Honda", "Toyota"]);
    assert_eq!(res.body["vehicle_types"][0]["name"], "Car");
    assert_eq!(res.body["categories"].as_array().map(Vec::len), Some(2));

    let res = app.get_with_token(routes::FORM_OPTIONS, &token_with(&[])).await;
    assert_eq!(res.status, 403);

    let res = app.get_without_token(routes::FORM_OPTIONS).await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn get_unknown_model_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(&routes::model(7)).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["message"], "Model 7 not found");
}
