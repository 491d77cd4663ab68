//! Route definitions for events and their nested resources.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{event, performance, schedule_break, track};
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// GET    /                                              list
/// POST   /                                              create
/// GET    /{id}                                          get_by_id
/// PUT    /{id}                                          update
/// DELETE /{id}                                          delete
/// GET    /{id}/cover                                    get_cover
/// POST   /{id}/cover                                    upload_cover (multipart)
///
/// GET    /{event_id}/performances                       list
/// POST   /{event_id}/performances                       create (JSON or multipart)
/// POST   /{event_id}/performances/reorder               reorder
/// GET    /{event_id}/performances/{id}                  get_by_id
/// PUT    /{event_id}/performances/{id}                  update
/// DELETE /{event_id}/performances/{id}                  delete
/// POST   /{event_id}/performances/{id}/upload           track::upload (multipart)
/// GET    /{event_id}/performances/{id}/files/{name}     track::serve (Range)
/// PUT    /{event_id}/performances/{id}/tracks/{tid}/completion  track::set_completion
/// DELETE /{event_id}/performances/{id}/tracks/{tid}     track::delete
///
/// GET    /{event_id}/breaks                             list
/// POST   /{event_id}/breaks                             create
/// POST   /{event_id}/breaks/reorder                     reorder
/// PUT    /{event_id}/breaks/{id}                        update
/// DELETE /{event_id}/breaks/{id}                        delete
/// ```
pub fn router() -> Router<AppState> {
    let performance_routes = Router::new()
        .route("/", get(performance::list).post(performance::create))
        .route("/reorder", post(performance::reorder))
        .route(
            "/{performance_id}",
            get(performance::get_by_id)
                .put(performance::update)
                .delete(performance::delete),
        )
        .route("/{performance_id}/upload", post(track::upload))
        .route("/{performance_id}/files/{filename}", get(track::serve))
        .route(
            "/{performance_id}/tracks/{track_id}/completion",
            put(track::set_completion),
        )
        .route(
            "/{performance_id}/tracks/{track_id}",
            axum::routing::delete(track::delete),
        );

    let break_routes = Router::new()
        .route("/", get(schedule_break::list).post(schedule_break::create))
        .route("/reorder", post(schedule_break::reorder))
        .route(
            "/{break_id}",
            put(schedule_break::update).delete(schedule_break::delete),
        );

    Router::new()
        .route("/", get(event::list).post(event::create))
        .route(
            "/{event_id}",
            get(event::get_by_id).put(event::update).delete(event::delete),
        )
        .route("/{event_id}/cover", get(event::get_cover).post(event::upload_cover))
        .nest("/{event_id}/performances", performance_routes)
        .nest("/{event_id}/breaks", break_routes)
}
