use folio_shared::display::star_glyphs;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct StarRatingProps {
    pub rating: f64,
}

/// Five read-only star glyphs for a (possibly fractional) rating.
#[function_component(StarRating)]
pub fn star_rating(props: &StarRatingProps) -> Html {
    html! {
        <div class="rating" aria-label={format!("Rated {} out of 5", props.rating)}>
            { for star_glyphs(props.rating).into_iter().map(|glyph| html! {
                <i class={glyph.css_class()}></i>
            }) }
        </div>
    }
}
