use catalog_server::entity::{exterior_color, variant, vehicle_model};
use catalog_server::extractors::auth::MODEL_EDIT;
use sea_orm::{EntityTrait, PaginatorTrait};

use crate::common::{IMAGE_BYTES, ModelForm, TestApp, routes, str_of, token_with};

#[tokio::test]
async fn publish_strips_currency_formatting() {
    let app = TestApp::spawn().await;

    let form = ModelForm::valid("Civic")
        .text("variantName1", "LX")
        .text("variantPrice1", "$22,000")
        .text("safetyRating", "4.5");
    let id = app.publish(&form).await;

    let model = app.model(id).await;
    assert_eq!(model["model_name"], "Civic");
    assert_eq!(model["brand"], "Honda");
    assert_eq!(model["author"], "editor");
    assert_eq!(model["starting_price"].as_f64(), Some(24500.0));
    assert_eq!(model["safety_rating"].as_f64(), Some(4.5));
    assert_eq!(model["status"], "import");
    assert_eq!(model["variants"][0]["name"], "LX");
    assert_eq!(model["variants"][0]["price"].as_f64(), Some(22000.0));
}

#[tokio::test]
async fn publish_without_image_reports_placeholder() {
    let app = TestApp::spawn().await;

    let id = app.publish(&ModelForm::valid("Accord")).await;

    let model = app.model(id).await;
    assert_eq!(model["model_image"], "/images/placeholder.png");
}

#[tokio::test]
async fn publish_stores_and_serves_uploads() {
    let app = TestApp::spawn().await;

    let form = ModelForm::valid("Civic")
        .image("modelImage")
        .text("exteriorColorName1", "Red")
        .image("exteriorColorImage1")
        .image("exteriorAdditionalColorImage1_2");
    let id = app.publish(&form).await;

    let model = app.model(id).await;
    let image = str_of(&model, "model_image");
    assert!(image.starts_with("/uploads/models/"), "got {image}");
    assert!(app.asset_exists(image));

    let red = &model["exterior_colors"][0];
    assert_eq!(red["name"], "Red");
    assert!(str_of(red, "color_image").starts_with("/uploads/colors/"));
    assert_eq!(red["images"].as_array().map(Vec::len), Some(1));

    let res = app
        .client
        .get(format!("http://{}{}", app.addr, image))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(
        res.headers()["content-type"].to_str().unwrap(),
        "image/png"
    );
    assert_eq!(res.bytes().await.unwrap().as_ref(), IMAGE_BYTES);
}

#[tokio::test]
async fn publish_builds_specification_tree() {
    let app = TestApp::spawn().await;

    let form = ModelForm::valid("Civic")
        .text("specTitle1", "Engine")
        .text("specListTitle1_1", "Performance")
        .text("specContentType1_1_1", "article")
        .text("specContent1_1_1", "158 hp")
        .text("specContentType1_1_2", "link")
        .text("specContent1_1_2", "https://example.com/dyno")
        .text("specListTitle1_2", "Economy")
        .text("specContentType1_2_1", "photo")
        .image("specPhoto1_2_1")
        .text("specSource1_2_1", "Press kit")
        .text("aboutContentType1", "article")
        .text("aboutContent1", "Eleventh generation.");
    let id = app.publish(&form).await;

    let model = app.model(id).await;
    let spec = &model["specifications"][0];
    assert_eq!(spec["title"], "Engine");
    assert_eq!(spec["lists"][0]["title"], "Performance");
    assert_eq!(spec["lists"][0]["contents"][0]["type"], "article");
    assert_eq!(spec["lists"][0]["contents"][0]["value"], "158 hp");
    assert_eq!(spec["lists"][0]["contents"][1]["type"], "link");

    let photo = &spec["lists"][1]["contents"][0];
    assert_eq!(photo["type"], "photo");
    assert_eq!(photo["source"], "Press kit");
    assert!(str_of(photo, "image_path").starts_with("/uploads/specs/"));

    assert_eq!(model["about"][0]["value"], "Eleventh generation.");
}

#[tokio::test]
async fn publish_duplicate_name_conflicts() {
    let app = TestApp::spawn().await;
    app.publish(&ModelForm::valid("Civic")).await;

    let duplicate = ModelForm::valid("Civic")
        .image("modelImage")
        .text("exteriorColorName1", "Red")
        .text("variantName1", "LX")
        .text("variantPrice1", "22000");
    let res = app.post_form(routes::MODELS, &duplicate, &app.token).await;
    assert_eq!(res.status, 409, "{}", res.text);
    assert_eq!(res.body["code"], "CONFLICT");

    assert_eq!(vehicle_model::Entity::find().count(&app.db).await.unwrap(), 1);
    assert_eq!(exterior_color::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(variant::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(app.stored_files("uploads/models"), 0);
}

#[tokio::test]
async fn same_name_under_another_brand_is_allowed() {
    let app = TestApp::spawn().await;
    app.publish(&ModelForm::valid("Civic")).await;

    // A repeated field keeps its first value, so this form is built from scratch.
    let other = ModelForm::default()
        .text("modelName", "Civic")
        .text("vehicleType", "Car")
        .text("category", "Sedan")
        .text("brand", "Toyota")
        .text("engineType", "Petrol")
        .text("startingPrice", "21000");
    app.publish(&other).await;

    assert_eq!(vehicle_model::Entity::find().count(&app.db).await.unwrap(), 2);
}

#[tokio::test]
async fn publish_unknown_brand_is_not_found() {
    let app = TestApp::spawn().await;

    let form = ModelForm::default()
        .text("modelName", "Model S")
        .text("vehicleType", "Car")
        .text("category", "Sedan")
        .text("brand", "Tesla")
        .text("engineType", "Electric")
        .text("startingPrice", "79990")
        .image("modelImage");
    let res = app.post_form(routes::MODELS, &form, &app.token).await;
    assert_eq!(res.status, 404, "{}", res.text);
    assert!(res.text.contains("Tesla"));

    assert_eq!(vehicle_model::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(app.stored_files("uploads/models"), 0);
}

#[tokio::test]
async fn publish_validation_errors() {
    let app = TestApp::spawn().await;

    let missing_name = ModelForm::default()
        .text("vehicleType", "Car")
        .text("category", "Sedan")
        .text("brand", "Honda")
        .text("engineType", "Petrol")
        .text("startingPrice", "1000")
        .image("modelImage");
    let res = app.post_form(routes::MODELS, &missing_name, &app.token).await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert!(res.text.contains("Model name is required"));
    assert_eq!(app.stored_files("uploads/models"), 0);

    let bad_kind = ModelForm::valid("Civic")
        .text("aboutContentType1", "video")
        .text("aboutContent1", "x");
    let res = app.post_form(routes::MODELS, &bad_kind, &app.token).await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert!(res.text.contains("Invalid content type 'video'"));

    let bad_price = ModelForm::valid("Civic")
        .text("variantName1", "LX")
        .text("variantPrice1", "cheap");
    let res = app.post_form(routes::MODELS, &bad_price, &app.token).await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert!(res.text.contains("Price of variant 1"));

    let not_an_image = ModelForm::valid("Civic").file("modelImage", "notes.txt", "text/plain");
    let res = app.post_form(routes::MODELS, &not_an_image, &app.token).await;
    assert_eq!(res.status, 400, "{}", res.text);

    assert_eq!(vehicle_model::Entity::find().count(&app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn publish_requires_permission() {
    let app = TestApp::spawn().await;
    let form = ModelForm::valid("Civic");

    let res = app
        .client
        .post(format!("http://{}{}", app.addr, routes::MODELS))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);

    let editor = token_with(&[MODEL_EDIT]);
    let res = app.post_form(routes::MODELS, &form, &editor).await;
    assert_eq!(res.status, 403, "{}", res.text);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
}
