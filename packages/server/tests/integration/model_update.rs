use catalog_server::entity::{
    exterior_color, exterior_color_image, interior_color, spec_content, specification,
    variant, vehicle_model,
};
use catalog_server::extractors::auth::MODEL_CREATE;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::Value;

use crate::common::{ModelForm, TestApp, routes, str_of, token_with};

fn ids(items: &Value) -> Vec<i64> {
    items
        .as_array()
        .expect("expected an array")
        .iter()
        .map(|item| item["id"].as_i64().expect("item without id"))
        .collect()
}

fn names(items: &Value) -> Vec<String> {
    items
        .as_array()
        .expect("expected an array")
        .iter()
        .map(|item| str_of(item, "name").to_string())
        .collect()
}

fn civic_with_sections() -> ModelForm {
    ModelForm::valid("Civic")
        .text("variantName1", "LX")
        .text("variantPrice1", "22000")
        .text("variantName2", "Sport")
        .text("variantPrice2", "25000")
        .text("siteName1", "Downtown Honda")
        .text("siteLink1", "555-0100")
        .text("aboutContentType1", "article")
        .text("aboutContent1", "Compact sedan.")
}

#[tokio::test]
async fn omitted_sections_are_preserved() {
    let app = TestApp::spawn().await;
    let id = app.publish(&civic_with_sections()).await;
    let before = app.model(id).await;

    let update = ModelForm::default()
        .text("modelName", "Civic")
        .text("vehicleType", "Car")
        .text("category", "Sedan")
        .text("brand", "Honda")
        .text("engineType", "Hybrid")
        .text("startingPrice", "$26,000");
    let res = app.put_form(&routes::model(id), &update, &app.token).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["message"], "Model updated successfully!");

    let after = app.model(id).await;
    assert_eq!(after["engine_type"], "Hybrid");
    assert_eq!(after["starting_price"].as_f64(), Some(26000.0));
    assert_eq!(ids(&after["variants"]), ids(&before["variants"]));
    assert_eq!(ids(&after["sites"]), ids(&before["sites"]));
    assert_eq!(ids(&after["about"]), ids(&before["about"]));
}

fn civic_with_colors() -> ModelForm {
    ModelForm::valid("Civic")
        .text("exteriorColorName1", "Red")
        .image("exteriorColorImage1")
        .image("exteriorAdditionalColorImage1_1")
        .text("exteriorColorName2", "Blue")
        .image("exteriorColorImage2")
        .text("interiorColorName1", "Black")
        .image("interiorColorImage1")
}

fn color_files(model: &Value) -> Vec<String> {
    let palettes = ["exterior_colors", "interior_colors"];
    palettes
        .iter()
        .flat_map(|p| model[*p].as_array().cloned().unwrap_or_default())
        .flat_map(|c| {
            let swatch = c["color_image"].as_str().map(str::to_string);
            let gallery: Vec<String> = c["images"]
                .as_array()
                .map(|a| a.iter().filter_map(|i| i.as_str().map(str::to_string)).collect())
                .unwrap_or_default();
            swatch.into_iter().chain(gallery)
        })
        .collect()
}

#[tokio::test]
async fn omitted_colors_keep_rows_and_files() {
    let app = TestApp::spawn().await;
    let id = app.publish(&civic_with_colors()).await;
    let before = app.model(id).await;
    let files = color_files(&before);
    assert_eq!(files.len(), 4);

    let update = ModelForm::default()
        .text("modelName", "Civic")
        .text("vehicleType", "Car")
        .text("category", "Sedan")
        .text("brand", "Honda")
        .text("engineType", "Hybrid")
        .text("startingPrice", "$24,500");
    let res = app.put_form(&routes::model(id), &update, &app.token).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let after = app.model(id).await;
    assert_eq!(after["engine_type"], "Hybrid");
    assert_eq!(after["exterior_colors"], before["exterior_colors"]);
    assert_eq!(after["interior_colors"], before["interior_colors"]);
    let db = &app.db;
    assert_eq!(exterior_color::Entity::find().count(db).await.unwrap(), 2);
    assert_eq!(exterior_color_image::Entity::find().count(db).await.unwrap(), 1);
    assert_eq!(interior_color::Entity::find().count(db).await.unwrap(), 1);
    for file in &files {
        assert!(app.asset_exists(file), "{file} should still exist");
    }
    assert_eq!(app.stored_files("uploads/colors"), 4);
}

#[tokio::test]
async fn exterior_update_leaves_interior_alone() {
    let app = TestApp::spawn().await;
    let id = app.publish(&civic_with_colors()).await;
    let before = app.model(id).await;
    let black = str_of(&before["interior_colors"][0], "color_image").to_string();

    let update = ModelForm::valid("Civic")
        .text("exteriorColorName1", "Red")
        .text("exteriorColorName2", "Silver");
    let res = app.put_form(&routes::model(id), &update, &app.token).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let after = app.model(id).await;
    assert_eq!(names(&after["exterior_colors"]), ["Red", "Silver"]);
    assert_eq!(
        after["exterior_colors"][0]["color_image"],
        before["exterior_colors"][0]["color_image"]
    );
    assert_eq!(ids(&after["interior_colors"]), ids(&before["interior_colors"]));
    assert_eq!(after["interior_colors"], before["interior_colors"]);
    assert!(app.asset_exists(&black));
}

#[tokio::test]
async fn unchanged_section_keeps_its_rows() {
    let app = TestApp::spawn().await;
    let id = app.publish(&civic_with_sections()).await;
    let before = app.model(id).await;

    let res = app
        .put_form(&routes::model(id), &civic_with_sections(), &app.token)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let after = app.model(id).await;
    assert_eq!(ids(&after["variants"]), ids(&before["variants"]));
    assert_eq!(ids(&after["sites"]), ids(&before["sites"]));
}

#[tokio::test]
async fn changed_section_is_replaced_wholesale() {
    let app = TestApp::spawn().await;
    let id = app.publish(&civic_with_sections()).await;
    let before = app.model(id).await;

    let update = ModelForm::valid("Civic")
        .text("variantName1", "LX")
        .text("variantPrice1", "22000")
        .text("variantName2", "Type R")
        .text("variantPrice2", "$44,990")
        .text("variantName3", "Hybrid")
        .text("variantPrice3", "29000");
    let res = app.put_form(&routes::model(id), &update, &app.token).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let after = app.model(id).await;
    assert_eq!(names(&after["variants"]), ["LX", "Type R", "Hybrid"]);
    assert_eq!(after["variants"][1]["price"].as_f64(), Some(44990.0));
    let old = ids(&before["variants"]);
    assert!(ids(&after["variants"]).iter().all(|id| !old.contains(id)));

    // Sites were not part of the form.
    assert_eq!(ids(&after["sites"]), ids(&before["sites"]));
}

#[tokio::test]
async fn color_images_survive_when_not_reuploaded() {
    let app = TestApp::spawn().await;
    let form = ModelForm::valid("Civic")
        .text("exteriorColorName1", "Red")
        .image("exteriorColorImage1")
        .image("exteriorAdditionalColorImage1_1");
    let id = app.publish(&form).await;
    let before = app.model(id).await;
    let red = &before["exterior_colors"][0];
    let swatch = str_of(red, "color_image").to_string();
    let gallery = red["images"][0].as_str().unwrap().to_string();

    let update = ModelForm::valid("Civic")
        .text("exteriorColorName1", "Red")
        .text("exteriorColorName2", "Blue");
    let res = app.put_form(&routes::model(id), &update, &app.token).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let after = app.model(id).await;
    assert_eq!(names(&after["exterior_colors"]), ["Red", "Blue"]);
    let red = &after["exterior_colors"][0];
    assert_eq!(red["color_image"], swatch.as_str());
    assert_eq!(red["images"][0], gallery.as_str());
    assert!(after["exterior_colors"][1]["color_image"].is_null());
    assert!(app.asset_exists(&swatch));
    assert!(app.asset_exists(&gallery));
}

#[tokio::test]
async fn reuploaded_images_replace_old_files() {
    let app = TestApp::spawn().await;
    let form = ModelForm::valid("Civic")
        .image("modelImage")
        .text("exteriorColorName1", "Red")
        .image("exteriorColorImage1");
    let id = app.publish(&form).await;
    let before = app.model(id).await;
    let old_hero = str_of(&before, "model_image").to_string();
    let old_swatch = str_of(&before["exterior_colors"][0], "color_image").to_string();

    let res = app.put_form(&routes::model(id), &form, &app.token).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let after = app.model(id).await;
    let new_hero = str_of(&after, "model_image");
    let new_swatch = str_of(&after["exterior_colors"][0], "color_image");
    assert_ne!(new_hero, old_hero);
    assert_ne!(new_swatch, old_swatch);
    assert!(app.asset_exists(new_hero));
    assert!(app.asset_exists(new_swatch));
    assert!(!app.asset_exists(&old_hero));
    assert!(!app.asset_exists(&old_swatch));
    assert_eq!(app.stored_files("uploads/models"), 1);
    assert_eq!(app.stored_files("uploads/colors"), 1);
}

#[tokio::test]
async fn removed_about_photo_is_deleted_from_disk() {
    let app = TestApp::spawn().await;
    let form = ModelForm::valid("Civic")
        .text("aboutContentType1", "photo")
        .image("aboutPhoto1")
        .text("aboutSource1", "Press kit")
        .text("aboutContentType2", "article")
        .text("aboutContent2", "Compact sedan.");
    let id = app.publish(&form).await;
    let photo = str_of(&app.model(id).await["about"][0], "image_path").to_string();

    let update = ModelForm::valid("Civic")
        .text("aboutContentType1", "article")
        .text("aboutContent1", "Compact sedan.");
    let res = app.put_form(&routes::model(id), &update, &app.token).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let after = app.model(id).await;
    assert_eq!(after["about"].as_array().map(Vec::len), Some(1));
    assert_eq!(after["about"][0]["type"], "article");
    assert!(!app.asset_exists(&photo));
}

#[tokio::test]
async fn stored_photos_survive_text_edits() {
    let app = TestApp::spawn().await;
    let form = ModelForm::valid("Civic")
        .text("aboutContentType1", "photo")
        .image("aboutPhoto1")
        .text("aboutSource1", "Press kit")
        .text("aboutContentType2", "article")
        .text("aboutContent2", "Compact sedan.")
        .text("specTitle1", "Engine")
        .text("specListTitle1_1", "Gallery")
        .text("specContentType1_1_1", "photo")
        .image("specPhoto1_1_1")
        .text("specSource1_1_1", "Honda media")
        .text("specContentType1_1_2", "article")
        .text("specContent1_1_2", "158 hp");
    let id = app.publish(&form).await;
    let before = app.model(id).await;
    let about_photo = str_of(&before["about"][0], "image_path").to_string();
    let spec_photo = str_of(
        &before["specifications"][0]["lists"][0]["contents"][0],
        "image_path",
    )
    .to_string();

    let update = ModelForm::valid("Civic")
        .text("aboutContentType1", "photo")
        .text("aboutSource1", "Press kit")
        .text("aboutContentType2", "article")
        .text("aboutContent2", "Compact hatchback.")
        .text("specTitle1", "Engine")
        .text("specListTitle1_1", "Gallery")
        .text("specContentType1_1_1", "photo")
        .text("specSource1_1_1", "Honda media")
        .text("specContentType1_1_2", "article")
        .text("specContent1_1_2", "180 hp");
    let res = app.put_form(&routes::model(id), &update, &app.token).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let after = app.model(id).await;
    assert_ne!(ids(&after["about"]), ids(&before["about"]));
    assert_eq!(after["about"][0]["image_path"], about_photo.as_str());
    assert_eq!(after["about"][0]["source"], "Press kit");
    assert_eq!(after["about"][1]["value"], "Compact hatchback.");

    let contents = &after["specifications"][0]["lists"][0]["contents"];
    assert_ne!(
        ids(contents),
        ids(&before["specifications"][0]["lists"][0]["contents"])
    );
    assert_eq!(contents[0]["image_path"], spec_photo.as_str());
    assert_eq!(contents[0]["source"], "Honda media");
    assert_eq!(contents[1]["value"], "180 hp");

    assert!(app.asset_exists(&about_photo));
    assert!(app.asset_exists(&spec_photo));
    assert_eq!(app.stored_files("uploads/about"), 1);
    assert_eq!(app.stored_files("uploads/specs"), 1);
}

#[tokio::test]
async fn spec_photo_without_image_rolls_back() {
    let app = TestApp::spawn().await;
    let form = ModelForm::valid("Civic")
        .image("modelImage")
        .text("exteriorColorName1", "Red")
        .image("exteriorColorImage1")
        .text("variantName1", "LX")
        .text("variantPrice1", "22000")
        .text("specTitle1", "Engine")
        .text("specListTitle1_1", "Performance")
        .text("specContentType1_1_1", "article")
        .text("specContent1_1_1", "158 hp");
    let id = app.publish(&form).await;
    let before = app.model(id).await;
    let hero = str_of(&before, "model_image").to_string();

    let update = ModelForm::default()
        .text("modelName", "Civic Si")
        .text("vehicleType", "Car")
        .text("category", "Sedan")
        .text("brand", "Honda")
        .text("engineType", "Petrol")
        .text("startingPrice", "29000")
        .image("modelImage")
        .text("exteriorColorName1", "Blue")
        .text("exteriorColorName2", "Green")
        .image("exteriorColorImage2")
        .text("variantName1", "Sport")
        .text("variantPrice1", "27000")
        .text("variantName2", "Touring")
        .text("variantPrice2", "31000")
        .text("specTitle1", "Engine")
        .text("specListTitle1_1", "Gallery")
        .text("specContentType1_1_1", "photo");
    let res = app.put_form(&routes::model(id), &update, &app.token).await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert!(str_of(&res.body, "message").starts_with("Failed to update model"));

    let after = app.model(id).await;
    assert_eq!(after["model_name"], "Civic");
    assert_eq!(after["model_image"], hero.as_str());
    assert_eq!(after["specifications"][0]["lists"][0]["title"], "Performance");
    assert_eq!(specification::Entity::find().count(&app.db).await.unwrap(), 1);
    assert_eq!(spec_content::Entity::find().count(&app.db).await.unwrap(), 1);

    // Colors and variants were reconciled before the failure and rolled back.
    assert_eq!(after["variants"], before["variants"]);
    assert_eq!(after["exterior_colors"], before["exterior_colors"]);
    assert_eq!(variant::Entity::find().count(&app.db).await.unwrap(), 1);
    assert_eq!(exterior_color::Entity::find().count(&app.db).await.unwrap(), 1);

    // The uploads from the failed request are gone; the stored images are not.
    assert!(app.asset_exists(&hero));
    assert!(app.asset_exists(str_of(&before["exterior_colors"][0], "color_image")));
    assert_eq!(app.stored_files("uploads/models"), 1);
    assert_eq!(app.stored_files("uploads/colors"), 1);
}

#[tokio::test]
async fn rename_onto_existing_model_conflicts() {
    let app = TestApp::spawn().await;
    app.publish(&ModelForm::valid("Civic")).await;
    let id = app.publish(&ModelForm::valid("Accord")).await;

    let res = app
        .put_form(&routes::model(id), &ModelForm::valid("Civic"), &app.token)
        .await;
    assert_eq!(res.status, 409, "{}", res.text);
    assert_eq!(app.model(id).await["model_name"], "Accord");
}

#[tokio::test]
async fn update_missing_model_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app
        .put_form(&routes::model(999), &ModelForm::valid("Civic"), &app.token)
        .await;
    assert_eq!(res.status, 404, "{}", res.text);
    assert_eq!(vehicle_model::Entity::find().count(&app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn update_requires_edit_permission() {
    let app = TestApp::spawn().await;
    let id = app.publish(&ModelForm::valid("Civic")).await;

    let creator = token_with(&[MODEL_CREATE]);
    let res = app
        .put_form(&routes::model(id), &ModelForm::valid("Civic"), &creator)
        .await;
    assert_eq!(res.status, 403, "{}", res.text);
}
