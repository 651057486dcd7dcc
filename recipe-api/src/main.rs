#[rocket::launch]
fn rocket() -> _ {
    recipe_api::rocket()
}
