#[cfg(test)]
mod tests {
    use crate::{auth, config::Config, create_app, raffle::SaveRafflePayload};

    use axum::{
        body::Body,
        http::{self, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn save_requires_identity_headers() {
        dotenv::dotenv().ok();
        let app = create_app(Config::load()).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/raffle/save")
                    .method(Method::POST)
                    .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires a running Postgres"]
    async fn save_load_clear_round_trip() {
        dotenv::dotenv().ok();
        let app = create_app(Config::load()).await;

        let payload = SaveRafflePayload {
            reddit_link: Some(
                "/r/PokemonRaffles/comments/abc123/nm_charizard_10_spots_at_5ea/".to_string(),
            ),
            total_spots: 10,
            cost_per_spot: 5.0,
            polling_interval: Some(30),
            participants: Vec::new(),
            fast_raffle_enabled: false,
            fast_raffle_start_time: None,
        };

        let save_response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/raffle/save")
                    .method(Method::POST)
                    .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                    .header(auth::USER_NAME_HEADER, "integration-tester")
                    .header(auth::USER_ID_HEADER, "424242")
                    .body(Body::from(serde_json::to_string(&payload).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(save_response.status(), StatusCode::OK);

        let body = hyper::body::to_bytes(save_response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(body["data"]["totalSpots"], 10);

        let load_response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/raffle/load")
                    .header(auth::USER_NAME_HEADER, "integration-tester")
                    .header(auth::USER_ID_HEADER, "424242")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(load_response.status(), StatusCode::OK);

        let body = hyper::body::to_bytes(load_response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["data"]["costPerSpot"], 5.0);

        let clear_response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/raffle/clear")
                    .method(Method::DELETE)
                    .header(auth::USER_NAME_HEADER, "integration-tester")
                    .header(auth::USER_ID_HEADER, "424242")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(clear_response.status(), StatusCode::OK);
    }
}
