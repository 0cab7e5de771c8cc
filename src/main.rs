#[rocket::launch]
fn rocket() -> _ {
    album_server::rocket()
}
