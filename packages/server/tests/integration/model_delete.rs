use catalog_server::entity::{
    about_content, available_site, exterior_color, exterior_color_image, interior_color,
    spec_content, specification, specification_list, variant, vehicle_model,
};
use catalog_server::extractors::auth::MODEL_EDIT;
use sea_orm::{EntityTrait, PaginatorTrait};

use crate::common::{ModelForm, TestApp, routes, str_of, token_with};

fn full_model(name: &str) -> ModelForm {
    ModelForm::valid(name)
        .image("modelImage")
        .text("exteriorColorName1", "Red")
        .image("exteriorColorImage1")
        .image("exteriorAdditionalColorImage1_1")
        .text("interiorColorName1", "Black")
        .image("interiorColorImage1")
        .text("variantName1", "LX")
        .text("variantPrice1", "22000")
        .text("siteName1", "Downtown Honda")
        .text("siteLink1", "https://dealer.example.com")
        .text("aboutContentType1", "photo")
        .image("aboutPhoto1")
        .text("specTitle1", "Engine")
        .text("specListTitle1_1", "Gallery")
        .text("specContentType1_1_1", "photo")
        .image("specPhoto1_1_1")
}

#[tokio::test]
async fn delete_cascades_rows_and_files() {
    let app = TestApp::spawn().await;
    let id = app.publish(&full_model("Civic")).await;
    let model = app.model(id).await;

    let files = [
        str_of(&model, "model_image").to_string(),
        str_of(&model["exterior_colors"][0], "color_image").to_string(),
        model["exterior_colors"][0]["images"][0]
            .as_str()
            .unwrap()
            .to_string(),
        str_of(&model["interior_colors"][0], "color_image").to_string(),
        str_of(&model["about"][0], "image_path").to_string(),
        str_of(
            &model["specifications"][0]["lists"][0]["contents"][0],
            "image_path",
        )
        .to_string(),
    ];
    for file in &files {
        assert!(app.asset_exists(file), "{file} should exist");
    }

    let res = app.delete_with_token(&routes::model(id), &app.token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["message"], "Model deleted successfully.");

    let res = app.get_without_token(&routes::model(id)).await;
    assert_eq!(res.status, 404);

    let db = &app.db;
    assert_eq!(vehicle_model::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(exterior_color::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(exterior_color_image::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(interior_color::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(variant::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(available_site::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(about_content::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(specification::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(specification_list::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(spec_content::Entity::find().count(db).await.unwrap(), 0);

    for file in &files {
        assert!(!app.asset_exists(file), "{file} should be removed");
    }
}

#[tokio::test]
async fn delete_leaves_other_models_alone() {
    let app = TestApp::spawn().await;
    let civic = app.publish(&full_model("Civic")).await;
    let accord = app.publish(&full_model("Accord")).await;
    let kept = app.model(accord).await;

    let res = app.delete_with_token(&routes::model(civic), &app.token).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let after = app.model(accord).await;
    assert_eq!(after["variants"], kept["variants"]);
    assert_eq!(after["exterior_colors"], kept["exterior_colors"]);
    assert!(app.asset_exists(str_of(&after, "model_image")));
    assert_eq!(app.stored_files("uploads/models"), 1);
}

#[tokio::test]
async fn delete_missing_model_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app.delete_with_token(&routes::model(42), &app.token).await;
    assert_eq!(res.status, 404, "{}", res.text);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn delete_requires_delete_permission() {
    let app = TestApp::spawn().await;
    let id = app.publish(&ModelForm::valid("Civic")).await;

    let editor = token_with(&[MODEL_EDIT]);
    let res = app.delete_with_token(&routes::model(id), &editor).await;
    assert_eq!(res.status, 403, "{}", res.text);
    assert_eq!(vehicle_model::Entity::find().count(&app.db).await.unwrap(), 1);
}
